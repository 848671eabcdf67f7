//! # Account Value Objects
//!
//! Read-only views of the `getAccount` API response. All balances are in
//! NQT (1 NXT = 10^8 NQT); asset quantities are in QNT, the asset's own
//! smallest unit.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::{NQT_ADJUST, PUBLIC_KEY_LENGTH};
use crate::error::NxtError;
use crate::identifier::to_rs;
use crate::response::Response;

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// A ledger account.
///
/// Two accounts are equal when their identifiers are; the balances are a
/// snapshot and do not take part in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: i64,
    /// Reed-Solomon form, e.g. `NXT-2222-2222-2222-22222`.
    pub account_rs: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// `None` until the account has announced its key.
    pub public_key: Option<[u8; PUBLIC_KEY_LENGTH]>,
    pub balance_nqt: i64,
    pub unconfirmed_balance_nqt: i64,
    pub effective_balance_nqt: i64,
    pub forged_balance_nqt: i64,
    pub asset_balances: Vec<AssetBalance>,
}

impl Account {
    /// Decode a `getAccount` response.
    ///
    /// `effectiveBalanceNXT` is reported in whole NXT and scaled to NQT here.
    /// A missing `accountRS` is derived from the identifier.
    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let account_id = response.get_id("account")?;
        let effective_nxt = response.opt_number::<i64>("effectiveBalanceNXT")?.unwrap_or(0);
        let effective_balance_nqt = effective_nxt.checked_mul(NQT_ADJUST).ok_or_else(|| {
            NxtError::invalid(
                "effectiveBalanceNXT",
                format!("{effective_nxt} NXT overflows the NQT range"),
            )
        })?;
        let asset_balances = response
            .get_list("assetBalances")?
            .iter()
            .map(AssetBalance::from_response)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            account_id,
            account_rs: response
                .opt_string("accountRS")?
                .unwrap_or_else(|| to_rs(account_id)),
            name: response.opt_string("name")?,
            description: response.opt_string("description")?,
            public_key: response.opt_hex_array::<PUBLIC_KEY_LENGTH>("publicKey")?,
            balance_nqt: response.get_long("balanceNQT")?,
            unconfirmed_balance_nqt: response.get_long("unconfirmedBalanceNQT")?,
            effective_balance_nqt,
            forged_balance_nqt: response.opt_number("forgedBalanceNQT")?.unwrap_or(0),
            asset_balances,
        })
    }

    /// Balance of one asset, if the account holds any.
    pub fn asset_balance(&self, asset_id: i64) -> Option<&AssetBalance> {
        self.asset_balances.iter().find(|b| b.asset_id == asset_id)
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.account_id == other.account_id
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.account_id.hash(state);
    }
}

// ---------------------------------------------------------------------------
// AssetBalance
// ---------------------------------------------------------------------------

/// Quantity of one asset held by an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset_id: i64,
    pub balance_qnt: i64,
    /// Present only in `getAccount` responses that include unconfirmed data.
    pub unconfirmed_balance_qnt: Option<i64>,
}

impl AssetBalance {
    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        Ok(Self {
            asset_id: response.get_id("asset")?,
            balance_qnt: response.get_long("balanceQNT")?,
            unconfirmed_balance_qnt: response.opt_number("unconfirmedBalanceQNT")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
