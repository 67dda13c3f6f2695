use broadside::{
    AiController, ClientNode, GameOutcome, HeartbeatTransport, InMemoryTransport, MatchConfig,
    MatchServer, DEFAULT_TICK,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;
use tokio::time::Duration;

fn status(outcome: Option<GameOutcome>) -> String {
    match outcome {
        Some(outcome) => format!("{:?}", outcome),
        None => "Unfinished".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        eprintln!("Usage: {} <seed1> <seed2> [tick_ms]", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;
    let tick = match args.get(3) {
        Some(ms) => Duration::from_millis(ms.parse()?),
        None => DEFAULT_TICK,
    };

    let server = MatchServer::new(MatchConfig::default(), tick)?;
    let handle = server.handle()?;
    let (s1, c1) = InMemoryTransport::pair();
    let (s2, c2) = InMemoryTransport::pair();
    handle.attach(HeartbeatTransport::disabled(s1));
    handle.attach(HeartbeatTransport::disabled(s2));
    drop(handle);

    let mut rng1 = SmallRng::seed_from_u64(seed1);
    let mut rng2 = SmallRng::seed_from_u64(seed2);
    let mut n1 = ClientNode::new(Box::new(AiController::new()), Box::new(c1));
    let mut n2 = ClientNode::new(Box::new(AiController::new()), Box::new(c2));

    let (summary, o1, o2) = tokio::try_join!(server.run(), n1.run(&mut rng1), n2.run(&mut rng2))?;

    let winner = match (o1, o2) {
        (Some(GameOutcome::Win), _) => Some("player1"),
        (_, Some(GameOutcome::Win)) => Some("player2"),
        _ => None,
    };

    let result = json!({
        "rounds": summary.rounds,
        "player1": {"status": status(o1), "rounds_seen": n1.rounds_seen()},
        "player2": {"status": status(o2), "rounds_seen": n2.rounds_seen()},
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
