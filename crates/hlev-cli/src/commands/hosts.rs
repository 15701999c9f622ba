//! Host selection

use clap::Args;
use hlev_analysis::{host_mask, HostCriteria, MaskOutputs};
use hlev_catalog::{CatalogError, Property};
use hlev_units::{Scalar, Unit};
use serde::Serialize;
use tracing::info;

use super::Context;
use crate::error::CliResult;

/// Select central, uncontaminated objects within a mass range
#[derive(Args, Debug)]
pub struct HostsCommand {
    /// Exclusive lower bound on M200, in Msun
    #[arg(long, default_value_t = 0.0)]
    pub min_mass: f64,

    /// Exclusive upper bound on M200, in Msun
    #[arg(long, default_value_t = f64::INFINITY)]
    pub max_mass: f64,

    /// Snapshot to select at (negative counts from the end)
    #[arg(short, long, default_value_t = -1, allow_hyphen_values = true)]
    pub snapshot: i64,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct HostRecord {
    index: usize,
    track: Option<usize>,
    m200_msun: f64,
    r200_mpc: f64,
}

impl HostsCommand {
    pub fn execute(self, context: &Context) -> CliResult<()> {
        let store = context.open_store()?;
        let criteria = HostCriteria {
            mass_min: Scalar::new(self.min_mass, Unit::MSUN),
            mass_max: Scalar::new(self.max_mass, Unit::MSUN),
            snapshot: self.snapshot,
        };

        let result = host_mask(&store, &criteria, MaskOutputs::WITH_INDICES)?;
        let indices = result.indices.unwrap_or_default();
        info!("{} hosts of {} objects", indices.len(), result.mask.len());

        // Track rows are optional; a run without a track table still lists hosts.
        let tracks = match store.property(Property::InterpGalaxyRevIndex) {
            Ok(rev) => Some(hlev_catalog::TrackIndex::from_raw(rev.value())?),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };

        let m200 = store.at_snapshot(Property::M200, self.snapshot)?.to(Unit::MSUN)?;
        let r200 = store.at_snapshot(Property::R200, self.snapshot)?.to(Unit::MPC)?;
        if r200.shape() != m200.shape() {
            return Err(CatalogError::shape_mismatch(
                Property::R200.name(),
                format!("{:?} like M200", m200.shape()),
                r200.shape(),
            )
            .into());
        }
        let records: Vec<HostRecord> = indices
            .iter()
            .map(|&i| HostRecord {
                index: i,
                track: tracks.as_ref().and_then(|t| t.rows().get(i).copied().flatten()),
                m200_msun: m200.value()[[i]],
                r200_mpc: r200.value()[[i]],
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        println!("{:>8} {:>8} {:>14} {:>10}", "index", "track", "M200[Msun]", "R200[Mpc]");
        for r in &records {
            println!(
                "{:>8} {:>8} {:>14.4e} {:>10.4}",
                r.index,
                r.track.map_or_else(|| "-".to_string(), |t| t.to_string()),
                r.m200_msun,
                r.r200_mpc
            );
        }
        Ok(())
    }
}
