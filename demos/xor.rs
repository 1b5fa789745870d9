extern crate neat_pilot;
use neat_pilot::neat::{common::Settings, network::Network, population::{Evaluator, Population}, seeded_rng};
use tracing::info;

const CASES: [([f64; 3], f64); 4] = [
    ([0.0, 0.0, 1.0], 0.0),
    ([0.0, 1.0, 1.0], 1.0),
    ([1.0, 0.0, 1.0], 1.0),
    ([1.0, 1.0, 1.0], 0.0),
];

struct XorEvaluator;

impl Evaluator for XorEvaluator {
    fn evaluate(&self, network: &mut Network) -> f64 {
        let mut acc = 0.0;
        for (inputs, expected) in CASES {
            match network.predict(&inputs) {
                Ok(output) => acc += (output[0] - expected).powi(2),
                Err(_) => return 0.0,
            }
        }
        4.0 - acc
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let settings = Settings {
        population_size: 150,
        ..Settings::standard(3, 1) //third input is the bias
    };
    let mut rng = seeded_rng(2);
    let mut population = Population::init(&mut rng, &settings)?;

    for _ in 0..300 {
        population.evaluate(&XorEvaluator);
        if population.champion().is_some_and(|genome| genome.fitness > 3.9) {
            break;
        }
        population.next_generation(&mut rng);
    }
    population.evaluate(&XorEvaluator);

    let Some(champion) = population.champion() else {
        return Ok(());
    };
    info!(
        generation = population.generation(),
        fitness = champion.fitness,
        hidden = champion.hidden_node_ids().len(),
        connections = champion.len(),
        "champion"
    );
    let mut network = Network::from_genome(champion);
    for (inputs, expected) in CASES {
        let output = network.predict(&inputs)?;
        println!("{:?} -> {:.3} (expected {})", &inputs[..2], output[0], expected);
    }
    Ok(())
}
