use crate::core::BankConfig;
use crate::strategy::TellerConfig;
use crate::types::{AccountAmount, LedgerError};
use crate::workload::WorkloadConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Run teller operations against a concurrent bank ledger
#[derive(Parser, Debug)]
#[command(name = "teller-ledger")]
#[command(about = "Run teller operations against a concurrent bank ledger", long_about = None)]
pub struct CliArgs {
    /// Operations CSV file (op,account,to,amount)
    #[arg(
        value_name = "OPERATIONS",
        required_unless_present = "simulate",
        conflicts_with = "simulate",
        help = "Path to the operations CSV file"
    )]
    pub input_file: Option<PathBuf>,

    /// Opening balances CSV file (account,balance)
    #[arg(
        long = "accounts",
        value_name = "PATH",
        help = "Opening balances CSV; without it a uniform bank is generated"
    )]
    pub accounts_file: Option<PathBuf>,

    /// Number of branches
    #[arg(
        long = "branches",
        value_name = "COUNT",
        default_value_t = 4,
        help = "Number of branches (required to cover every account in --accounts)"
    )]
    pub branches: u32,

    /// Accounts per branch for a generated bank
    #[arg(long = "accounts-per-branch", value_name = "COUNT", default_value_t = 16)]
    pub accounts_per_branch: u32,

    /// Opening balance of every account in a generated bank
    #[arg(long = "initial-balance", value_name = "AMOUNT", default_value_t = 1000)]
    pub initial_balance: AccountAmount,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "concurrent",
        help = "'sync' for a single teller or 'concurrent' for parallel tellers"
    )]
    pub strategy: StrategyType,

    /// Number of parallel tellers (concurrent strategy only)
    #[arg(
        long = "tellers",
        value_name = "COUNT",
        help = "Number of parallel tellers (default: CPU cores)"
    )]
    pub tellers: Option<usize>,

    /// Generate this many random operations instead of reading a file
    #[arg(long = "simulate", value_name = "COUNT")]
    pub simulate: Option<usize>,

    /// Seed for --simulate
    #[arg(long = "seed", value_name = "SEED", default_value_t = 0)]
    pub seed: u64,

    /// Largest amount generated by --simulate
    #[arg(long = "max-amount", value_name = "AMOUNT", default_value_t = 100)]
    pub max_amount: AccountAmount,

    /// Which balances to write to stdout
    #[arg(long = "report", value_name = "REPORT", default_value = "accounts")]
    pub report: ReportType,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Concurrent,
}

/// Available reports
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportType {
    Accounts,
    Branches,
}

impl CliArgs {
    /// Shape of the generated bank, used when no accounts file is given
    pub fn to_bank_config(&self) -> Result<BankConfig, LedgerError> {
        BankConfig::new(self.branches, self.accounts_per_branch, self.initial_balance)
    }

    /// Teller configuration, defaulting to one teller per CPU core
    pub fn to_teller_config(&self) -> TellerConfig {
        match self.tellers {
            Some(tellers) => TellerConfig::new(tellers),
            None => TellerConfig::default(),
        }
    }

    /// Workload configuration when `--simulate` is given
    pub fn to_workload_config(&self) -> Option<WorkloadConfig> {
        self.simulate.map(|operations| WorkloadConfig {
            operations,
            max_amount: self.max_amount,
            transfers_only: false,
            seed: self.seed,
        })
    }
}
