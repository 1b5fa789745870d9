extern crate neat_pilot;
use neat_pilot::neat::{common::Settings, entropy_rng, network::Network, population::Population, seeded_rng};
use tracing::{debug, info};

const RANGE_SENSOR_DEGREES: [f64; 5] = [-90., -45., 0., 45., 90.];
const MAX_SENSOR_RANGE: f64 = 250.;
const SENSOR_STEP: f64 = 2.;

const SPEED: f64 = 3.5;
const TURN_RATE_DEGREES: f64 = 5.;
const MAX_STEPS: usize = 1500;

/// A winding corridor along the x axis: the centre line is a sine wave and the
/// walls sit `half_width` above and below it.
struct Corridor {
    amplitude: f64,
    wavelength: f64,
    half_width: f64,
    length: f64,
}

impl Corridor {
    fn centre(&self, x: f64) -> f64 {
        self.amplitude * (x / self.wavelength * std::f64::consts::TAU).sin()
    }

    fn is_open(&self, x: f64, y: f64) -> bool {
        x >= 0. && (y - self.centre(x)).abs() < self.half_width
    }

    /// Distance to the nearest wall along a ray, scaled to `[0, 1]`.
    fn range(&self, x: f64, y: f64, heading_degrees: f64) -> f64 {
        let (dy, dx) = heading_degrees.to_radians().sin_cos();
        let mut distance = 0.;
        while distance < MAX_SENSOR_RANGE && self.is_open(x + dx * distance, y + dy * distance) {
            distance += SENSOR_STEP;
        }
        distance.min(MAX_SENSOR_RANGE) / MAX_SENSOR_RANGE
    }
}

struct Agent {
    x: f64,
    y: f64,
    heading: f64,
    alive: bool,
    steps: usize,
}

impl Agent {
    fn spawn() -> Agent {
        Agent { x: 1., y: 0., heading: 0., alive: true, steps: 0 }
    }

    fn sense(&self, corridor: &Corridor) -> Vec<f64> {
        RANGE_SENSOR_DEGREES
            .iter()
            .map(|offset| corridor.range(self.x, self.y, self.heading + offset))
            .collect()
    }

    /// Two outputs, the larger one wins: 0 turns right, 1 turns left.
    fn step(&mut self, corridor: &Corridor, network: &mut Network) {
        let turn = match network.predict(&self.sense(corridor)) {
            Ok(outputs) if outputs[1] > outputs[0] => TURN_RATE_DEGREES,
            Ok(_) => -TURN_RATE_DEGREES,
            Err(_) => 0.,
        };
        self.heading += turn;
        let (dy, dx) = self.heading.to_radians().sin_cos();
        self.x += dx * SPEED;
        self.y += dy * SPEED;
        self.steps += 1;
        if !corridor.is_open(self.x, self.y) {
            self.alive = false;
        }
    }

    fn fitness(&self, corridor: &Corridor) -> f64 {
        let progress = self.x.clamp(0., corridor.length);
        if progress >= corridor.length {
            // reward finishing quickly
            progress + (MAX_STEPS - self.steps) as f64
        } else {
            progress
        }
    }
}

fn drive(corridor: &Corridor, network: &mut Network) -> f64 {
    let mut agent = Agent::spawn();
    while agent.alive && agent.steps < MAX_STEPS && agent.x < corridor.length {
        agent.step(corridor, network);
    }
    agent.fitness(corridor)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let corridor = Corridor {
        amplitude: 120.,
        wavelength: 900.,
        half_width: 60.,
        length: 3000.,
    };
    let settings = Settings::standard(RANGE_SENSOR_DEGREES.len(), 2);
    // pass a seed to replay a run
    let mut rng = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .map_or_else(entropy_rng, seeded_rng);
    let mut population = Population::init(&mut rng, &settings)?;

    for _ in 0..100 {
        // the simulation runs outside the population and hands fitness back by index
        let fitness: Vec<f64> = population
            .decode_networks()
            .iter_mut()
            .map(|network| drive(&corridor, network))
            .collect();
        let finished = fitness.iter().filter(|&&f| f >= corridor.length).count();
        debug!(finished, "corridor runs scored");
        population.assign_fitness(&fitness);

        if finished > 0 {
            break;
        }
        population.next_generation(&mut rng);
    }

    if let Some(champion) = population.champion() {
        info!(
            generation = population.generation(),
            fitness = champion.fitness,
            hidden = champion.hidden_node_ids().len(),
            connections = champion.len(),
            "best driver"
        );
    }
    Ok(())
}
