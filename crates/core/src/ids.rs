#![forbid(unsafe_code)]

use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, AssetIdError> {
        let value = value.into();
        validate_asset_id(&value)?;
        Ok(Self(value.trim().to_string()))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::try_new(raw).map_err(|err| de::Error::custom(err.message()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetIdError {
    Empty,
    TooLong,
    ContainsControl,
}

impl AssetIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "asset id must not be empty",
            Self::TooLong => "asset id is too long",
            Self::ContainsControl => "asset id contains control characters",
        }
    }
}

fn validate_asset_id(value: &str) -> Result<(), AssetIdError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AssetIdError::Empty);
    }
    if trimmed.len() > 128 {
        return Err(AssetIdError::TooLong);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(AssetIdError::ContainsControl);
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, TransactionIdError> {
        let value = value.into();
        validate_transaction_id(&value)?;
        Ok(Self(value.trim().to_string()))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::try_new(raw).map_err(|err| de::Error::custom(err.message()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionIdError {
    Empty,
    TooLong,
    ContainsControl,
}

impl TransactionIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "transaction id must not be empty",
            Self::TooLong => "transaction id is too long",
            Self::ContainsControl => "transaction id contains control characters",
        }
    }
}

fn validate_transaction_id(value: &str) -> Result<(), TransactionIdError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransactionIdError::Empty);
    }
    if trimmed.len() > 128 {
        return Err(TransactionIdError::TooLong);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(TransactionIdError::ContainsControl);
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ManagerId(String);

impl ManagerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, ManagerIdError> {
        let value = value.into();
        validate_manager_id(&value)?;
        Ok(Self(value.trim().to_string()))
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ManagerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::try_new(raw).map_err(|err| de::Error::custom(err.message()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagerIdError {
    Empty,
    TooLong,
    InvalidFirstChar,
    ContainsControl,
}

impl ManagerIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "manager id must not be empty",
            Self::TooLong => "manager id is too long",
            Self::InvalidFirstChar => "manager id must start with an alphanumeric character",
            Self::ContainsControl => "manager id contains control characters",
        }
    }
}

fn validate_manager_id(value: &str) -> Result<(), ManagerIdError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ManagerIdError::Empty);
    }
    if trimmed.len() > 128 {
        return Err(ManagerIdError::TooLong);
    }
    let Some(first) = trimmed.chars().next() else {
        return Err(ManagerIdError::Empty);
    };
    if !first.is_ascii_alphanumeric() {
        return Err(ManagerIdError::InvalidFirstChar);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ManagerIdError::ContainsControl);
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LeagueId(String);

impl LeagueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, LeagueIdError> {
        let value = value.into();
        validate_league_id(&value)?;
        Ok(Self(value.trim().to_string()))
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LeagueId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::try_new(raw).map_err(|err| de::Error::custom(err.message()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeagueIdError {
    Empty,
    TooLong,
    InvalidFirstChar,
    ContainsControl,
}

impl LeagueIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "league id must not be empty",
            Self::TooLong => "league id is too long",
            Self::InvalidFirstChar => "league id must start with an alphanumeric character",
            Self::ContainsControl => "league id contains control characters",
        }
    }
}

fn validate_league_id(value: &str) -> Result<(), LeagueIdError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeagueIdError::Empty);
    }
    if trimmed.len() > 128 {
        return Err(LeagueIdError::TooLong);
    }
    let Some(first) = trimmed.chars().next() else {
        return Err(LeagueIdError::Empty);
    };
    if !first.is_ascii_alphanumeric() {
        return Err(LeagueIdError::InvalidFirstChar);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(LeagueIdError::ContainsControl);
    }
    Ok(())
}
