use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "occupancy-cli")]
#[command(about = "Front-desk CLI for the room occupancy service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[arg(short, long, env = "OCCUPANCY_TOKEN")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List rooms with current occupancy
    Rooms,
    /// Create a room
    CreateRoom { name: String, capacity: i64 },
    /// Change a room's capacity
    SetCapacity { room_id: String, capacity: i64 },
    /// List visitors currently inside
    Active {
        #[arg(long)]
        room_id: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Check a visitor into a room
    CheckIn {
        #[arg(long)]
        room_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        cpf: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        birth_date: Option<String>,
    },
    /// Check a visitor out
    CheckOut { visit_id: String },
    /// Show one visit
    Visit { visit_id: String },
    /// Browse visit history
    History {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        room_id: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Browse the audit log
    Logs {
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.token))?,
    );

    let base = cli.url.trim_end_matches('/');
    let request = match cli.command {
        Commands::Rooms => client.get(format!("{base}/rooms")),
        Commands::CreateRoom { name, capacity } => client
            .post(format!("{base}/rooms"))
            .json(&json!({ "name": name, "capacity": capacity })),
        Commands::SetCapacity { room_id, capacity } => client
            .patch(format!("{base}/rooms/{room_id}"))
            .json(&json!({ "capacity": capacity })),
        Commands::Active { room_id, search } => client
            .get(format!("{base}/visitors/active"))
            .query(&params([("roomId", room_id), ("search", search)])),
        Commands::CheckIn {
            room_id,
            name,
            cpf,
            email,
            birth_date,
        } => client.post(format!("{base}/visitors")).json(&json!({
            "roomId": room_id,
            "name": name,
            "cpf": cpf,
            "email": email,
            "birthDate": birth_date,
        })),
        Commands::CheckOut { visit_id } => {
            client.post(format!("{base}/visitors/{visit_id}/checkout"))
        }
        Commands::Visit { visit_id } => client.get(format!("{base}/visitors/{visit_id}")),
        Commands::History {
            from,
            to,
            room_id,
            search,
            page,
            page_size,
        } => client.get(format!("{base}/visits/history")).query(&params([
            ("from", from),
            ("to", to),
            ("roomId", room_id),
            ("search", search),
            ("page", page.map(|p| p.to_string())),
            ("pageSize", page_size.map(|p| p.to_string())),
        ])),
        Commands::Logs {
            level,
            search,
            from,
            to,
            page,
            page_size,
        } => client.get(format!("{base}/logs")).query(&params([
            ("level", level),
            ("search", search),
            ("from", from),
            ("to", to),
            ("page", page.map(|p| p.to_string())),
            ("pageSize", page_size.map(|p| p.to_string())),
        ])),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await?;
    Ok(())
}

/// Keep only the query parameters that were given.
fn params<const N: usize>(pairs: [(&'static str, Option<String>); N]) -> Vec<(&'static str, String)> {
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
