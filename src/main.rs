//! Barbershop demo: a single barber (capacity 1) with a limited number
//! of chairs. Clients arrive at uniform intervals, wait if a chair is
//! free, balk otherwise, and are served for an exponential time.
//!
//! Run with `--replications`, `--horizon`, and `--seed` to reproduce a
//! run exactly.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kairos::{
    Event, EventKind, Model, Resource, ResourceReport, SimContext, SimError, SimResult, SimTime,
    Simulation, VariateStream,
};

const ARRIVAL: EventKind = EventKind::new(1);
const BEGIN_SERVICE: EventKind = EventKind::new(2);
const DEPARTURE: EventKind = EventKind::new(3);

#[derive(Parser, Debug)]
#[command(name = "kairos-sim", about = "Barbershop simulation demo")]
struct Args {
    /// Number of independent replications.
    #[arg(long, default_value_t = 100)]
    replications: u32,

    /// Simulated time at which each replication stops.
    #[arg(long, default_value_t = 480.0)]
    horizon: f64,

    /// Random seed for the variate stream.
    #[arg(long, default_value_t = 127)]
    seed: u64,
}

/// A client of the shop.
struct Client {
    serial: u32,
}

struct Barbershop {
    barber: Resource,
    variates: VariateStream,
    chairs: u32,
    occupied: u32,
    next_serial: u32,
    turned_away: u32,
}

impl Barbershop {
    fn new(seed: u64) -> Self {
        Barbershop {
            barber: Resource::new("John the barber", 1),
            variates: VariateStream::new(seed),
            chairs: 5,
            occupied: 0,
            next_serial: 1,
            turned_away: 0,
        }
    }
}

impl Model for Barbershop {
    type Entity = Client;

    fn init(&mut self) {
        self.barber.reset_stats();
    }

    fn begin_replication(&mut self) {
        self.barber.reset_counters();
        self.barber.purge_queue();
        self.occupied = 0;
        self.next_serial = 1;
    }

    fn initial_entity(&mut self) -> Client {
        let serial = self.next_serial;
        self.next_serial += 1;
        Client { serial }
    }

    fn handle(&mut self, ctx: &mut SimContext<'_, Client>, event: &Event) -> SimResult<()> {
        match event.kind {
            EventKind::START => {
                let first = self.variates.uniform(0.0, 10.0);
                ctx.schedule_after(first, ARRIVAL, event.entity);
            }
            ARRIVAL => {
                if self.occupied < self.chairs {
                    self.occupied += 1;
                    self.barber.acquire(ctx, BEGIN_SERVICE, event.entity, 1);
                } else {
                    self.turned_away += 1;
                    debug!(client = %event.entity, now = %ctx.now(), "no free chair, client leaves");
                    ctx.dispose(event.entity);
                }
                // The next client is already on the way.
                let serial = self.next_serial;
                self.next_serial += 1;
                let next = ctx.spawn(Client { serial });
                let gap = self.variates.uniform(1.0, 10.0);
                ctx.schedule_after(gap, ARRIVAL, next);
            }
            BEGIN_SERVICE => {
                let client = ctx
                    .entity(event.entity)
                    .ok_or(SimError::EntityNotFound(event.entity))?;
                debug!(serial = client.serial, now = %ctx.now(), "haircut starts");
                let service = self.variates.exponential(10.0);
                ctx.schedule_after(service, DEPARTURE, event.entity);
            }
            DEPARTURE => {
                self.barber.release(ctx);
                self.occupied -= 1;
                ctx.dispose(event.entity);
            }
            kind => {
                return Err(SimError::UnknownEvent {
                    kind,
                    at: ctx.now(),
                })
            }
        }
        Ok(())
    }

    fn end_replication(&mut self, now: SimTime) {
        self.barber.record_replication(now);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let model = Barbershop::new(args.seed);
    let mut sim = Simulation::new(model, SimTime::ZERO, SimTime::new(args.horizon));

    println!("BEGIN barbershop simulation");
    println!(
        "  replications={}, horizon={}, seed={}",
        args.replications, args.horizon, args.seed
    );
    sim.run(args.replications);

    println!(
        "END barbershop simulation ({} events dispatched, {} clients turned away in total)",
        sim.events_processed(),
        sim.model().turned_away
    );
    println!();
    println!("{}", ResourceReport::of(&sim.model().barber));
}
