use genetrader::{
    config::FitnessCriteria,
    engines::generation::{Agent, AgentBank},
};
use std::path::PathBuf;

fn bank_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("genetrader-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn agent(fitness: f64, sharpe: f64, trades: usize) -> Agent {
    let mut agent = Agent::new(
        vec!["RSI".to_string(), "SMA".to_string(), "ATR".to_string(), "OBV".to_string()],
        vec![0.5, -0.5, 0.5, -0.5],
    )
    .unwrap();
    agent.fitness = fitness;
    agent.test_metrics.sharpe_ratio = sharpe;
    agent.test_metrics.total_trades = trades;
    agent.test_metrics.profit_factor = 1.5;
    agent.test_metrics.max_drawdown = 0.05;
    agent
}

#[test]
fn test_save_and_reload() {
    let dir = bank_dir("round-trip");
    let original = agent(0.61, 1.2, 150);

    let id = {
        let mut bank = AgentBank::open(&dir).unwrap();
        bank.save_agent(&original, 3).unwrap()
    };
    assert_eq!(id, "AG-0003-0000");
    assert!(dir.join("generation_3").join("AG-0003-0000.bin").exists());
    assert!(dir.join("metadata.json").exists());

    // A reopened bank reads the metadata back from disk.
    let bank = AgentBank::open(&dir).unwrap();
    assert_eq!(bank.len(), 1);
    let record = bank.record(&id).unwrap();
    assert_eq!(record.generation, 3);
    assert_eq!(record.indicators, original.indicators);
    assert_eq!(record.metrics["fitness"], 0.61);
    assert_eq!(bank.load_agent(&id).unwrap(), original);
    assert!(bank.load_agent("AG-9999-9999").is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_best_and_qualified_agents() {
    let dir = bank_dir("ranking");
    let mut bank = AgentBank::open(&dir).unwrap();
    let weak = bank.save_agent(&agent(0.2, 0.5, 150), 0).unwrap();
    let strong = bank.save_agent(&agent(0.7, 2.0, 150), 1).unwrap();
    let few_trades = bank.save_agent(&agent(0.5, 1.5, 20), 2).unwrap();
    assert_eq!(few_trades, "AG-0002-0002");

    let best: Vec<String> = bank
        .get_best_agents(2, "test_sharpe_ratio")
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(best, vec![strong.clone(), few_trades.clone()]);

    let unknown_metric = bank.get_best_agents(10, "no_such_metric");
    assert_eq!(unknown_metric.len(), 3);

    let qualified = bank.qualified_agents(&FitnessCriteria::default());
    assert_eq!(qualified, vec![strong]);
    assert!(!qualified.contains(&weak));

    std::fs::remove_dir_all(&dir).unwrap();
}
