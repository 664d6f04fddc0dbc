use actix_web::{
    body::BoxBody,
    get,
    http::{header::ContentType, StatusCode},
    post, web, App, HttpResponse, HttpServer, ResponseError,
};
use baccarat_sim::prelude::*;
use baccarat_sim::write::SimulationReport;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{error, info};

/// A struct for handling the configuration of a simulation run. Meant to be deserialized from JSON.
#[derive(Debug, Deserialize)]
struct SimConfig {
    rounds: u64,
    workers: Option<usize>,
    decks_count: Option<usize>,
    cut_card_threshold: Option<usize>,
    seed: Option<u64>,
}

impl From<SimConfig> for BaccaratSimulatorConfig {
    fn from(value: SimConfig) -> Self {
        let mut game = GameConfig::new();
        if let Some(decks) = value.decks_count {
            game.decks_count(decks);
        }
        if let Some(threshold) = value.cut_card_threshold {
            game.cut_card_threshold(threshold);
        }

        let mut builder = BaccaratSimulatorConfig::new();
        builder
            .game(game.build())
            .total_rounds(value.rounds)
            .num_workers(value.workers.unwrap_or(4));
        if let Some(seed) = value.seed {
            builder.seed(seed);
        }
        builder.build()
    }
}

/// An enum that will handle user facing errors
#[derive(Debug)]
enum UserError {
    InternalError,
    TableNotConfigured,
    BadInput(String),
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserError::InternalError => write!(f, "an internal error occured"),
            UserError::TableNotConfigured => write!(
                f,
                "unable to play a round, a table has not been configured"
            ),
            UserError::BadInput(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for UserError {}

impl ResponseError for UserError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            UserError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::TableNotConfigured => StatusCode::BAD_REQUEST,
            UserError::BadInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<SimulationError> for UserError {
    fn from(value: SimulationError) -> Self {
        match value {
            SimulationError::NoRounds
            | SimulationError::Game(BaccaratGameError::NoDecks)
            | SimulationError::Game(BaccaratGameError::TooManyDecks { .. })
            | SimulationError::Game(BaccaratGameError::CutCardOutOfRange { .. }) => {
                UserError::BadInput(value.to_string())
            }
            e => {
                error!(error = %e, "simulation failed");
                UserError::InternalError
            }
        }
    }
}

type TableState = web::Data<Mutex<Option<BaccaratTableSim>>>;

/// A handler that runs a simulation with the parameters in the body of the request and responds
/// with the report as JSON.
#[post("/run-sim")]
async fn run_sim(params: web::Json<SimConfig>) -> Result<HttpResponse, UserError> {
    let config = BaccaratSimulatorConfig::from(params.into_inner());
    let summary = web::block(move || BaccaratSimulator::new(config).run())
        .await
        .map_err(|_| UserError::InternalError)??;
    info!(rounds = summary.total_rounds, "simulation served");
    Ok(HttpResponse::Ok().json(SimulationReport::from(&summary)))
}

/// A handler that will configure a new table, replacing any table already in play.
#[post("/config-table")]
async fn configure_table(
    params: web::Json<GameConfig>,
    table: TableState,
) -> Result<HttpResponse, UserError> {
    let new_table = BaccaratTableSim::new(params.into_inner())
        .map_err(|e| UserError::BadInput(e.to_string()))?;
    let mut guard = table.lock().map_err(|_| UserError::InternalError)?;
    *guard = Some(new_table);
    Ok(HttpResponse::Ok().body("table created successfully"))
}

/// A handler that plays one round at the configured table with the bets in the request body,
/// e.g. `{"Player": 100, "Dragon": 10}`.
#[post("/play-round")]
async fn play_round(
    bets: web::Json<Bets>,
    table: TableState,
) -> Result<HttpResponse, UserError> {
    let mut guard = table.lock().map_err(|_| UserError::InternalError)?;
    let table = guard.as_mut().ok_or(UserError::TableNotConfigured)?;
    match table.play_round(&bets) {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e @ BaccaratGameError::InvalidBet(_)) => Err(UserError::BadInput(e.to_string())),
        Err(e) => {
            error!(error = %e, "round could not be dealt");
            Err(UserError::InternalError)
        }
    }
}

/// A handler reporting the state of the configured table.
#[get("/table")]
async fn table_status(table: TableState) -> Result<HttpResponse, UserError> {
    let guard = table.lock().map_err(|_| UserError::InternalError)?;
    let table = guard.as_ref().ok_or(UserError::TableNotConfigured)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "config": table.config(),
        "cards_left": table.cards_left(),
        "shoes_used": table.shoes_used(),
    })))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let address = "127.0.0.1";
    let port = 8080;
    info!("listening at {}:{}", address, port);

    let table: TableState = web::Data::new(Mutex::new(None));

    HttpServer::new(move || {
        App::new()
            .app_data(table.clone())
            .service(run_sim)
            .service(configure_table)
            .service(play_round)
            .service(table_status)
    })
    .bind((address, port))?
    .run()
    .await
}
