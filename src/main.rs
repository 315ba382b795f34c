use rcharts::charts::errors::Error;

mod batch;
mod cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    match cli::run().await {
        Ok(()) => {}
        Err(e @ Error::Usage(_)) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
