//! Declared property table

use clap::{Args, ValueEnum};
use hlev_catalog::{Namespace, ProperCorrection, Property};

use crate::error::CliResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NamespaceArg {
    Scalar,
    Positional,
    Snip,
    Track,
}

impl From<NamespaceArg> for Namespace {
    fn from(arg: NamespaceArg) -> Self {
        match arg {
            NamespaceArg::Scalar => Namespace::Scalar,
            NamespaceArg::Positional => Namespace::Positional,
            NamespaceArg::Snip => Namespace::Snip,
            NamespaceArg::Track => Namespace::Track,
        }
    }
}

/// List declared properties with their load metadata
#[derive(Args, Debug)]
pub struct KeysCommand {
    /// Only list one namespace
    #[arg(long, value_enum)]
    pub namespace: Option<NamespaceArg>,

    /// Print names only
    #[arg(long)]
    pub names_only: bool,
}

impl KeysCommand {
    pub fn execute(self) -> CliResult<()> {
        let filter: Option<Namespace> = self.namespace.map(Into::into);
        let properties = Property::ALL
            .iter()
            .copied()
            .filter(|p| filter.map_or(true, |ns| p.namespace() == ns));

        if self.names_only {
            for p in properties {
                println!("{}", p);
            }
            return Ok(());
        }

        println!(
            "{:<28} {:<10} {:<13} {:<4} {:<8} {}",
            "name", "namespace", "unit", "log", "sentinel", "proper"
        );
        for p in properties {
            let spec = p.spec();
            println!(
                "{:<28} {:<10} {:<13} {:<4} {:<8} {}",
                spec.name,
                format!("{:?}", spec.namespace).to_lowercase(),
                p.unit().to_string(),
                if spec.log_stored { "yes" } else { "no" },
                spec.sentinel.map_or_else(|| "-".to_string(), |s| s.to_string()),
                match spec.proper {
                    ProperCorrection::None => "-",
                    ProperCorrection::SnapshotAxis => "snapshot axis",
                    ProperCorrection::TrackTimes => "track times",
                }
            );
        }
        Ok(())
    }
}
