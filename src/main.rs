use chessaid::board::{Color, Entity, FenBoard, LiveBoard};
use chessaid::controls::Controls;
use chessaid::highlight::LogHighlighter;
use chessaid::pipeline::{Outcome, Pipeline};
use chessaid::solver::{HttpTransport, SolverClient, DEFAULT_ENDPOINT};
use chessaid::status::StatusBoard;
use chessaid::sync::TurnSynchronizer;
use log::{error, info, warn};
use std::env;
use std::error::Error;
use std::io::{self, BufRead};
use std::sync::Arc;
use structopt::StructOpt;

/// Asks a chess solver for the best move and highlights it
#[derive(StructOpt, Debug)]
#[structopt(name = "chessaid")]
struct Opt {
   /// Solver endpoint, overrides CHESSAID_ENDPOINT
   #[structopt(long = "endpoint")]
   endpoint: Option<String>,
   /// Search depth handed to the solver
   #[structopt(short = "d", long = "depth", default_value = "17")]
   depth: u32,
   /// Time budget for the solver, in milliseconds
   #[structopt(short = "t", long = "max-think-time", default_value = "100")]
   max_think_time: u64,
   /// Let the solver search to depth regardless of the time budget
   #[structopt(long = "disregard-think-time")]
   disregard_think_time: bool,
   /// The side we are playing
   #[structopt(short = "c", long = "color", default_value = "white")]
   color: Color,
   /// Solve this one position and exit instead of reading positions from stdin
   #[structopt(long = "fen")]
   fen: Option<String>,
   /// Start with auto calculate turned on
   #[structopt(short = "a", long = "auto")]
   auto: bool,
}

fn solver_endpoint(opt: &Opt) -> String {
   if let Some(endpoint) = &opt.endpoint {
      return endpoint.clone();
   }
   match env::var("CHESSAID_ENDPOINT") {
      Ok(endpoint) => {
         info!("Found solver endpoint in environment, using that and proceeding.");
         endpoint
      }
      Err(env::VarError::NotPresent) => DEFAULT_ENDPOINT.into(),
      Err(env::VarError::NotUnicode(_)) => {
         warn!("Solver endpoint environment variable found, but with invalid unicode. Ignoring.");
         DEFAULT_ENDPOINT.into()
      }
   }
}

fn main() {
   pretty_env_logger::init();
   let opt = Opt::from_args();

   if let Err(e) = run(opt) {
      error!("{}", e);
      std::process::exit(1);
   }
}

fn run(opt: Opt) -> Result<(), Box<dyn Error>> {
   let solver = SolverClient::new(&solver_endpoint(&opt), HttpTransport::new()?)?;
   info!("using solver at {}", solver.endpoint());
   let controls = Arc::new(Controls::new(opt.depth, opt.max_think_time, opt.disregard_think_time));
   let status = Arc::new(StatusBoard::new());
   let highlighter = Arc::new(LogHighlighter::<Entity>::new());

   if let Some(fen) = &opt.fen {
      let board = Arc::new(FenBoard::from_fen(fen, opt.color)?);
      let pipeline = Pipeline::new(board, solver, highlighter, controls, status);
      let moved = pipeline.run().is_moved();
      print_panel(pipeline.status());
      if !moved {
         std::process::exit(1);
      }
      return Ok(());
   }

   controls.set_auto_calculate(opt.auto);
   let board = Arc::new(LiveBoard::new(opt.color));
   let pipeline = Arc::new(Pipeline::new(board.clone(), solver, highlighter, controls.clone(), status));
   let sync = TurnSynchronizer::new(Arc::clone(&pipeline)).spawn();

   // One position per line; `run`, `auto on` and `auto off` stand in for
   // the panel's button and toggle.
   let stdin = io::stdin();
   for line in stdin.lock().lines() {
      let line = match line {
         Ok(line) => line,
         Err(e) => {
            error!("Encountered I/O error reading positions: {}", e);
            break;
         }
      };
      match line.trim() {
         "run" => {
            if let Outcome::Busy = pipeline.run() {
               println!("already calculating");
            }
            print_panel(pipeline.status());
         }
         "auto on" => controls.set_auto_calculate(true),
         "auto off" => controls.set_auto_calculate(false),
         "status" => print_panel(pipeline.status()),
         position => {
            if let Err(e) = board.update(position) {
               warn!("ignoring position: {}", e);
            }
         }
      }
   }

   sync.stop();
   Ok(())
}

fn print_panel(status: &StatusBoard) {
   println!("{}", status.label());
   let output = status.output();
   if !output.is_empty() {
      println!("{}", output);
   }
}
