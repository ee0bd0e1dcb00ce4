use crate::error::ConfigError;
use core_types::{FundCode, FundProduct};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// The immutable set of fund products known to the platform.
///
/// Built once at startup from validated configuration and then only ever borrowed.
/// A catalog cannot be modified after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FundCatalog {
    products: BTreeMap<FundCode, FundProduct>,
}

impl FundCatalog {
    /// Validates the product definitions and builds the catalog.
    pub fn new(products: Vec<FundProduct>) -> Result<Self, ConfigError> {
        if products.is_empty() {
            return Err(ConfigError::ValidationError(
                "the fund catalog must define at least one fund".to_string(),
            ));
        }

        let mut map = BTreeMap::new();
        for product in products {
            validate_product(&product)?;
            let code = product.code;
            if map.insert(code, product).is_some() {
                return Err(ConfigError::ValidationError(format!(
                    "fund {} is defined more than once",
                    code
                )));
            }
        }

        tracing::debug!(funds = map.len(), "Fund catalog built.");
        Ok(Self { products: map })
    }

    pub fn get(&self, code: FundCode) -> Result<&FundProduct, ConfigError> {
        self.products
            .get(&code)
            .ok_or_else(|| ConfigError::UnknownFund(code.to_string()))
    }

    /// Resolves a raw fund code from a snapshot against the catalog.
    pub fn resolve(&self, code: &str) -> Result<&FundProduct, ConfigError> {
        let code: FundCode = code
            .parse()
            .map_err(|_| ConfigError::UnknownFund(code.to_string()))?;
        self.get(code)
    }

    pub fn products(&self) -> impl Iterator<Item = &FundProduct> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn validate_product(product: &FundProduct) -> Result<(), ConfigError> {
    let code = product.code;
    if product.guaranteed {
        return Err(ConfigError::ValidationError(format!(
            "fund {} is marked guaranteed; no fund on the platform offers a guarantee",
            code
        )));
    }
    if product.monthly_rate_pct < Decimal::ZERO {
        return Err(ConfigError::ValidationError(format!(
            "fund {} has a negative monthly rate",
            code
        )));
    }
    if product.minimum_investment < Decimal::ZERO {
        return Err(ConfigError::ValidationError(format!(
            "fund {} has a negative minimum investment",
            code
        )));
    }
    if product.redemption_frequency_months == 0 {
        return Err(ConfigError::ValidationError(format!(
            "fund {} must have a redemption frequency of at least one month",
            code
        )));
    }
    if code == FundCode::Unlimited && !product.is_performance_share() {
        return Err(ConfigError::ValidationError(format!(
            "fund {} is a performance-share fund and must have a monthly rate of 0",
            code
        )));
    }
    Ok(())
}
