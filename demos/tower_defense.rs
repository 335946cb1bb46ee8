use tilephys::*;

fn print_board(grid: &Grid) {
    let cols = grid.cfg().cols;
    for row in grid.tiles().chunks(cols) {
        let line: String = row
            .iter()
            .map(|t| match t.state() {
                _ if t.is_blocked() => '#',
                TileState::Start => 'S',
                TileState::Base => 'B',
                TileState::Path => '*',
                TileState::Default => '.',
            })
            .collect();
        println!("{}", line);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => GridConfig::load(path)?,
        None => GridConfig::default(),
    };
    let mut grid = Grid::new(cfg)?;
    print_board(&grid);

    // Wall off the middle column except its last row
    let mid = grid.cfg().cols / 2;
    let ts = grid.cfg().tile_size;
    for row in 0..grid.cfg().rows {
        let x = (mid as f32 * ts + ts / 2.0) as i32;
        let y = (grid.cfg().start_y + row as f32 * ts) as i32;
        if grid.process_click(x, y).is_none() {
            continue;
        }
        match grid.build_tower() {
            Some(pos) => println!("tower at ({:.0}, {:.0})", pos.x, pos.y),
            None => println!("tower at row {} rejected", row),
        }
    }
    println!();
    print_board(&grid);

    let mut agent = NavAgent::for_grid(&grid);
    let start = grid.start_tile();
    let mut pos = grid.tile(start).map(|t| t.position()).unwrap_or_default();
    agent.start_path(&grid);
    let mut steps = 0;
    while let Some(next) = agent.next_waypoint() {
        let Some(target) = grid.tile(next).map(|t| t.position()) else { break };
        // Walk at most 16 px per step
        let delta = target - pos;
        pos += delta.clamp_length_max(16.0);
        agent.update(&grid, pos);
        steps += 1;
    }
    println!("agent reached the base in {} steps", steps);
    Ok(())
}
