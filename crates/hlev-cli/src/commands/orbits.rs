//! Satellite orbit summaries

use clap::Args;
use hlev_analysis::{relative_distances, satellite_selector, summarize, SatelliteCriteria};
use hlev_catalog::{Host, Property};
use hlev_units::{Scalar, Unit};
use serde::Serialize;
use tracing::{info, warn};

use super::Context;
use crate::error::{CliError, CliResult};

/// First infall and pericenter of every satellite of a host
#[derive(Args, Debug)]
pub struct OrbitsCommand {
    /// Host object index
    #[arg(long)]
    pub host: usize,

    /// Satellite search radius in units of the host's R200
    #[arg(long, default_value_t = hlev_analysis::DEFAULT_RADIUS_FACTOR)]
    pub radius_factor: f64,

    /// Snapshot at which satellites are selected
    #[arg(short, long, default_value_t = -1, allow_hyphen_values = true)]
    pub snapshot: i64,

    /// Radius below which pericenters and infall count, in Mpc
    /// (defaults to radius-factor × R200 at the selection snapshot)
    #[arg(long)]
    pub peri_cut: Option<f64>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct OrbitRecord {
    index: usize,
    first_infall_gyr: Option<f64>,
    first_pericenter_gyr: Option<f64>,
    pericenter_radius_mpc: Option<f64>,
}

fn defined(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

impl OrbitsCommand {
    pub fn execute(self, context: &Context) -> CliResult<()> {
        if self.radius_factor.is_nan() || self.radius_factor <= 0.0 {
            return Err(CliError::invalid_args("--radius-factor must be positive"));
        }
        let store = context.open_store()?;
        let criteria = SatelliteCriteria {
            radius_factor: self.radius_factor,
            snapshot: self.snapshot,
        };

        let host = Host::new(&store, self.host).with_satellites(satellite_selector(&store, criteria))?;
        let sats = host
            .sats()
            .ok_or_else(|| CliError::invalid_args("satellite selection produced no view"))?;
        info!("host {} has {} satellites", self.host, sats.count());
        if sats.count() == 0 {
            warn!("nothing to analyse");
        }

        let cut = match self.peri_cut {
            Some(mpc) => Scalar::new(mpc, Unit::MPC),
            None => {
                let snap = store.snapshots().resolve(self.snapshot)?;
                let r200 = host.property(Property::R200)?;
                let r200 = r200
                    .scalar_at(&[snap])
                    .ok_or_else(|| CliError::invalid_args("host has no R200 at the selection snapshot"))?;
                r200 * self.radius_factor
            }
        };

        let positions = sats.property(Property::Centre)?;
        let host_path = host.property(Property::Centre)?;
        let r = relative_distances(&positions, &host_path, store.box_length())?.to(Unit::MPC)?;
        let t = store.snapshots().times();
        let summary = summarize(&r, &t, cut, cut)?;

        let records: Vec<OrbitRecord> = sats
            .indices()
            .into_iter()
            .enumerate()
            .map(|(k, index)| OrbitRecord {
                index,
                first_infall_gyr: defined(summary.first_infall.value()[[k]]),
                first_pericenter_gyr: defined(summary.first_pericenter.time.value()[[k]]),
                pericenter_radius_mpc: defined(summary.first_pericenter.radius.value()[[k]]),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v));
        println!("cut: {:.3} {}", cut.value, cut.unit);
        println!("{:>8} {:>12} {:>12} {:>12}", "index", "infall[Gyr]", "peri[Gyr]", "r_peri[Mpc]");
        for r in &records {
            println!(
                "{:>8} {:>12} {:>12} {:>12}",
                r.index,
                show(r.first_infall_gyr),
                show(r.first_pericenter_gyr),
                show(r.pericenter_radius_mpc)
            );
        }
        Ok(())
    }
}
