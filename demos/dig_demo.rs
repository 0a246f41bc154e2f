use digplan::render::{self, GridStage};
use digplan::{Planner, Scenario};
use tracing_subscriber::EnvFilter;

fn get_scenario() -> Planner {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 2 {
        let content = std::fs::read_to_string(&args[1]).expect("Failed to read the scenario file");
        let scenario = Scenario::from_json(&content).expect("Failed to parse the scenario file");
        scenario.into_planner()
    } else {
        Scenario::reference().into_planner()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut planner = get_scenario();

    println!("Initial grid:");
    println!(
        "{}\n",
        render::render_lines(&render::snapshot(&planner, GridStage::Initial))
    );

    if let Err(e) = planner.assign_tasks() {
        eprintln!("planning failed: {e}");
        std::process::exit(1);
    }

    println!(
        "Estimated completion time: {} ticks\n",
        planner.get_estimated_completion_time()
    );

    for robot in planner.robots() {
        println!("{} Path Log: {}", robot.name, robot.path_log().join(" -> "));
    }

    println!("\nGrid after sending dig locations:");
    println!(
        "{}",
        render::render_lines(&render::snapshot(&planner, GridStage::AfterDigs))
    );
    println!(
        "\nFinal grid after tasks (total ticks: {}):",
        planner.get_estimated_completion_time()
    );
    println!(
        "{}",
        render::render_lines(&render::snapshot(&planner, GridStage::Final))
    );
}
