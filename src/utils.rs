//! Utils

use clap::Parser;

use crate::config::ClientConfig;

/// Arguments for the cart demo
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// Fixture set to load the catalog and cart from
    #[clap(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Product ids to select; every row is selected when omitted
    #[clap(short, long = "select", value_delimiter = ',')]
    pub selected: Vec<String>,

    /// Product id to toggle in the kits favourites
    #[clap(long)]
    pub favorite: Option<String>,

    /// Output file path
    #[clap(short, long)]
    pub out: Option<String>,

    /// Client configuration
    #[command(flatten)]
    pub config: ClientConfig,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn selection_accepts_comma_separated_ids() -> TestResult {
        let args = ExampleCartArgs::try_parse_from(["cart", "--select", "K100,L200", "-f", "worked_example"])?;

        assert_eq!(args.selected, vec!["K100", "L200"]);
        assert_eq!(args.fixture, "worked_example");
        assert_eq!(args.config.page_size, 10);

        Ok(())
    }
}
