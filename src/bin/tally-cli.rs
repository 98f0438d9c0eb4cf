use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "tally-cli")]
#[command(about = "Operator CLI for the SDI tally bridge", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:80")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every camera's tally state
    Status,
    /// Set a camera's program/preview lights
    Set {
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        cam: u8,
        #[arg(long)]
        program: bool,
        #[arg(long)]
        preview: bool,
    },
    /// Turn a camera's lights off
    Off {
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        cam: u8,
    },
    /// Print the bridge's info page
    Page,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let path = match cli.command {
        Commands::Status => "/status".to_string(),
        Commands::Set { cam, program, preview } => format!(
            "/tally?cam={}&pgm={}&pvw={}",
            cam,
            u8::from(program),
            u8::from(preview)
        ),
        Commands::Off { cam } => format!("/tally?cam={}&pgm=0&pvw=0", cam),
        Commands::Page => {
            let res = client.get(format!("{}/", base)).send().await?;
            println!("{}", res.text().await?);
            return Ok(());
        }
    };

    let res = client.get(format!("{}{}", base, path)).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: bridge returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("{}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);

    if json.get("success") == Some(&Value::Bool(false)) {
        eprintln!("Warning: device did not confirm the tally state");
        std::process::exit(2);
    }
    Ok(())
}
