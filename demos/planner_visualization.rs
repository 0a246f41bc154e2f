use digplan::grid::GridPoint;
use digplan::robot::RobotEvent;
use digplan::Scenario;
use macroquad::prelude::*;
use quad_rand as rand;

const CELL: f32 = 40.0;

fn cell_center(point: GridPoint) -> (f32, f32) {
    (
        point.x as f32 * CELL + CELL / 2.0,
        point.y as f32 * CELL + CELL / 2.0,
    )
}

#[macroquad::main("Dig Planner Visualization")]
async fn main() {
    let mut planner = Scenario::reference().into_planner();
    planner.assign_tasks().expect("planning failed");

    // One positional trace per robot, replayed step by step
    let traces: Vec<Vec<GridPoint>> = planner
        .robots()
        .iter()
        .map(|robot| {
            robot
                .history()
                .iter()
                .filter_map(|event| match event {
                    RobotEvent::Position(p) => Some(*p),
                    _ => None,
                })
                .collect()
        })
        .collect();
    let max_len = traces.iter().map(|trace| trace.len()).max().unwrap_or(0);

    let mut agent_colors = vec![];
    for _ in 0..traces.len() {
        let r = rand::gen_range(0.3, 1.0);
        let g = rand::gen_range(0.3, 1.0);
        let b = rand::gen_range(0.3, 1.0);

        agent_colors.push(Color::new(r, g, b, 1.0));
    }

    let mut last_update = std::time::SystemTime::now();
    let mut time = 0;
    loop {
        clear_background(BLACK);

        for obstacle in planner.obstacles() {
            draw_rectangle(
                obstacle.x as f32 * CELL,
                obstacle.y as f32 * CELL,
                CELL,
                CELL,
                WHITE,
            );
        }

        for site in planner.drop_off_locations() {
            draw_rectangle(site.x as f32 * CELL, site.y as f32 * CELL, CELL, CELL, GREEN);
        }

        for dig in planner.dig_points() {
            let (x, y) = cell_center(*dig);
            draw_circle(x, y, CELL / 4.0, BLUE);
        }

        for (agent, trace) in traces.iter().enumerate() {
            let Some(&pos) = trace.get(time.min(trace.len().saturating_sub(1))) else {
                continue;
            };
            let (x, y) = cell_center(pos);
            draw_circle(x, y, CELL / 2.5, agent_colors[agent]);
        }

        if last_update.elapsed().unwrap().as_secs_f64() > 1.0 {
            time += 1;
            if time >= max_len {
                time = 0;
            }
            last_update = std::time::SystemTime::now();
        }

        next_frame().await
    }
}
