use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use school_timetable::config::{request_from_env, AppConfig};
use school_timetable::display::{print_generation_report, print_plan_summary};
use school_timetable::parser::SchoolData;
use school_timetable::schedule::{GenerationInputs, PeriodGrid, PlanSession, TemplateSource};
use school_timetable::store::JsonFilePlanStore;
use school_timetable::web;

const USAGE: &str = "usage:\n  school-timetable generate <plan_id> <template_id>\n  school-timetable show <plan_id> [template_id]\n  school-timetable web [port]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = AppConfig::from_env();

    match args.get(1).map(String::as_str) {
        Some("web") => {
            let port = args.get(2)
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080);

            println!("Starting web server on port {}...", port);
            println!("Access the API at http://localhost:{}/api/plans/<plan_id>", port);

            web::start_server(port, config).await?;
        }
        Some("generate") => {
            let (Some(plan_id), Some(template_id)) = (args.get(2), args.get(3)) else {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            };
            let request = request_from_env(template_id)?;

            println!("Loading school data from {}...", config.data_dir.display());
            let school = SchoolData::load(&config.data_dir)?;
            let inputs = GenerationInputs::gather(&school, &school, &request.template_id)?;

            let store = JsonFilePlanStore::new(&config.plan_dir);
            let mut session = PlanSession::load(&store, plan_id)?;
            let mut rng = match request.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let report = session.generate(&inputs, &request.generation_config(), &mut rng)?;
            session.save(&store)?;
            print_generation_report(plan_id, &report);
            println!("Plan saved to {}", config.plan_dir.join(format!("{}.json", plan_id)).display());
        }
        Some("show") => {
            let Some(plan_id) = args.get(2) else {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            };
            let store = JsonFilePlanStore::new(&config.plan_dir);
            let session = PlanSession::load(&store, plan_id)?;

            let grid = match args.get(3) {
                Some(template_id) => {
                    let school = SchoolData::load(&config.data_dir)?;
                    Some(PeriodGrid::new(
                        school.list_periods(template_id)?,
                        school.list_active_days(template_id)?,
                    )?)
                }
                None => None,
            };
            print_plan_summary(plan_id, session.current(), grid.as_ref());
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
