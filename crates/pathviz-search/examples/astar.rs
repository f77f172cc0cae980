use std::ops::ControlFlow;

use pathviz_search::{CellState, Grid, find_path};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // S = start, E = end, # = obstacle, . = free
    let mut grid = Grid::from_ascii(
        "
        S.........
        .##....##.
        ....#.....
        ..####.#..
        .....#.#..
        .###.#.##.
        ...#......
        .#.#.###..
        .#......#.
        ...###...E
        ",
    )?;

    let start = grid.find(CellState::Start).ok_or("layout has no start cell")?;
    let end = grid.find(CellState::End).ok_or("layout has no end cell")?;

    println!("Grid:");
    print!("{grid}");
    println!("\nStart: {start}, Goal: {end}");

    let mut steps = 0;
    let result = find_path(&mut grid, start, end, |_| {
        steps += 1;
        ControlFlow::Continue(())
    });

    println!("\n{result} after {steps} steps");
    match result.length() {
        Some(length) => println!("Length of path: {length}"),
        None => println!("No path found."),
    }

    println!("\nGrid after search (o = frontier, x = visited, * = path):");
    print!("{grid}");

    Ok(())
}
