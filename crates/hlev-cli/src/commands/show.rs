//! Property summaries

use clap::Args;
use hlev_catalog::{EntityView, Property, Selection};
use hlev_units::{Quantity, Unit};
use tracing::info;

use super::Context;
use crate::error::{CliError, CliResult};

/// Summarize one property of the configured run
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Property name, e.g. M200 or snipCoordinates
    pub name: String,

    /// Restrict to one object
    #[arg(short, long)]
    pub object: Option<usize>,

    /// Restrict to one snapshot (negative counts from the end)
    #[arg(short, long, allow_hyphen_values = true)]
    pub snapshot: Option<i64>,

    /// Convert to this unit before printing
    #[arg(short, long)]
    pub unit: Option<String>,

    /// Print every value
    #[arg(long)]
    pub values: bool,
}

impl ShowCommand {
    pub fn execute(self, context: &Context) -> CliResult<()> {
        let property: Property = self.name.parse()?;
        let store = context.open_store()?;

        let mut quantity = match self.object {
            Some(index) => EntityView::new(&store, Selection::Single(index)).property(property)?,
            None => store.property(property)?.as_ref().clone(),
        };

        if let Some(snapshot) = self.snapshot {
            let index = store.snapshots().resolve(snapshot)?;
            let axis = if self.object.is_some() { 0 } else { 1 };
            if quantity.ndim() <= axis || quantity.shape()[axis] <= index {
                return Err(CliError::invalid_args(format!(
                    "{} with shape {:?} has no snapshot axis to index",
                    property,
                    quantity.shape()
                )));
            }
            quantity = quantity.index_axis(axis, index);
        }

        if let Some(symbol) = &self.unit {
            let unit: Unit = symbol.parse()?;
            quantity = quantity.to(unit)?;
        }

        info!("{} loaded from {}", property, store.run());
        print_summary(property, &quantity);
        if self.values {
            println!("{}", quantity.value());
        }
        Ok(())
    }
}

fn print_summary(property: Property, quantity: &Quantity) {
    let finite: Vec<f64> = quantity
        .value()
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();

    println!("name:    {}", property);
    println!("unit:    {}", quantity.unit());
    println!("shape:   {:?}", quantity.shape());
    println!("defined: {} of {}", quantity.count_defined(), quantity.len());
    if finite.is_empty() {
        println!("range:   undefined");
    } else {
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!("range:   {:e} .. {:e}", min, max);
    }
}
