#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use broadside::{
    init_logging, AiController, ClientNode, GameOutcome, HeartbeatTransport, InMemoryTransport,
    MatchConfig, MatchServer, TcpTransport, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
};
#[cfg(feature = "std")]
use clap::{Args, Parser};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::net::TcpListener;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[cfg(feature = "std")]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(feature = "std")]
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Match settings shared by every hosting command.
#[derive(Args, Clone, Debug)]
#[cfg(feature = "std")]
struct MatchArgs {
    #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
    width: u16,
    #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
    height: u16,
    #[arg(long, help = "Ticks a player may keep the opponent waiting before forfeiting")]
    submit_timeout: Option<u32>,
    #[arg(long, default_value_t = 20, help = "Length of one coordinator tick in milliseconds")]
    tick_ms: u64,
    #[arg(long, help = "Allow leaving Build with ships still unplaced")]
    partial_fleet: bool,
}

#[cfg(feature = "std")]
impl MatchArgs {
    fn config(&self) -> MatchConfig {
        MatchConfig::default()
            .with_grid(self.width, self.height)
            .with_submit_timeout(self.submit_timeout)
            .with_full_fleet_required(!self.partial_fleet)
    }

    fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Host a match on this machine between two AI players.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[command(flatten)]
        game: MatchArgs,
    },
    /// Host a networked match and wait for two players to join.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[command(flatten)]
        game: MatchArgs,
    },
    /// Join a networked match with an AI player.
    Join {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>, offset: u64) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s.wrapping_add(offset)),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
fn describe(outcome: Option<GameOutcome>) -> &'static str {
    match outcome {
        Some(GameOutcome::Win) => "won",
        Some(GameOutcome::Lose) => "lost",
        Some(GameOutcome::Tie) => "tied",
        None => "did not finish",
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local { seed, game } => {
            println!("Starting local AI vs AI match...");
            if let Some(s) = seed {
                println!("Using fixed seed: {} (match will be reproducible)", s);
            }
            let server = MatchServer::new(game.config(), game.tick())?;
            let handle = server.handle()?;

            let (server_end1, client_end1) = InMemoryTransport::pair();
            let (server_end2, client_end2) = InMemoryTransport::pair();
            handle.attach(HeartbeatTransport::disabled(server_end1));
            handle.attach(HeartbeatTransport::disabled(server_end2));
            drop(handle);

            let mut rng1 = make_rng(seed, 0);
            let mut rng2 = make_rng(seed, 1);
            let mut node1 = ClientNode::new(Box::new(AiController::new()), Box::new(client_end1));
            let mut node2 = ClientNode::new(Box::new(AiController::new()), Box::new(client_end2));

            let (summary, outcome1, outcome2) =
                tokio::try_join!(server.run(), node1.run(&mut rng1), node2.run(&mut rng2))?;
            println!("Match finished after {} rounds.", summary.rounds);
            println!("Player 0 {}.", describe(outcome1));
            println!("Player 1 {}.", describe(outcome2));
        }
        Commands::Serve { bind, game } => {
            println!("Starting match server at {}...", bind);
            let listener = TcpListener::bind(&bind).await?;
            let server = MatchServer::new(game.config(), game.tick())?;
            let handle = server.handle()?;

            let acceptor = tokio::spawn(async move {
                loop {
                    match listener.accept().await {
                        Ok((stream, addr)) => {
                            log::info!("connection from {}", addr);
                            handle.attach(HeartbeatTransport::new(
                                TcpTransport::new(stream),
                                HEARTBEAT_INTERVAL,
                                IDLE_TIMEOUT,
                            ));
                        }
                        Err(e) => log::warn!("accept failed: {}", e),
                    }
                }
            });
            println!("Waiting for players to join...");
            let summary = server.run().await;
            acceptor.abort();
            let summary = summary?;
            println!(
                "Served {} match(es); last one took {} rounds: {:?}",
                summary.matches_played, summary.rounds, summary.outcomes
            );
        }
        Commands::Join { connect, seed } => {
            println!("Connecting to match server at {}...", connect);
            if let Some(s) = seed {
                println!("Using fixed seed: {} (placement and targeting will be reproducible)", s);
            }
            let tcp = TcpTransport::connect(&connect).await?;
            let transport = HeartbeatTransport::new(tcp, HEARTBEAT_INTERVAL, IDLE_TIMEOUT);
            println!("Connected successfully!");

            let mut rng = make_rng(seed, 0);
            let mut node = ClientNode::new(Box::new(AiController::new()), Box::new(transport));
            match node.run(&mut rng).await {
                Ok(outcome) => println!("You {}.", describe(outcome)),
                Err(e) => eprintln!("Match ended with an error: {}", e),
            }
        }
    }
    Ok(())
}
