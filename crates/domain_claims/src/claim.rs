//! Claim aggregate

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, CoreError, PolicyId};
use domain_policy::Policy;

use crate::error::ClaimError;

pub const DEFAULT_APPROVAL_TEXT: &str = "Siniestro aprobado";
pub const DEFAULT_REJECTION_TEXT: &str = "Siniestro rechazado";

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    #[serde(rename = "reportado")]
    Reported,
    #[serde(rename = "en_revision")]
    UnderReview,
    #[serde(rename = "aprobado")]
    Approved,
    #[serde(rename = "rechazado")]
    Rejected,
    #[serde(rename = "pagado")]
    Paid,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 5] = [
        ClaimStatus::Reported,
        ClaimStatus::UnderReview,
        ClaimStatus::Approved,
        ClaimStatus::Rejected,
        ClaimStatus::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Reported => "reportado",
            ClaimStatus::UnderReview => "en_revision",
            ClaimStatus::Approved => "aprobado",
            ClaimStatus::Rejected => "rechazado",
            ClaimStatus::Paid => "pagado",
        }
    }

    /// Still awaiting a decision
    pub fn is_open(&self) -> bool {
        matches!(self, ClaimStatus::Reported | ClaimStatus::UnderReview)
    }

    /// No further changes of any kind
    pub fn is_closed(&self) -> bool {
        matches!(self, ClaimStatus::Rejected | ClaimStatus::Paid)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::unknown_value("claim status", s))
    }
}

/// Type of loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Muerte,
    /// Total disability
    Invalidez,
    InvalidezParcial,
    GastosMedicos,
    Hospitalizacion,
    IncapacidadTemporal,
    Otros,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Muerte => "muerte",
            ClaimType::Invalidez => "invalidez",
            ClaimType::InvalidezParcial => "invalidez_parcial",
            ClaimType::GastosMedicos => "gastos_medicos",
            ClaimType::Hospitalizacion => "hospitalizacion",
            ClaimType::IncapacidadTemporal => "incapacidad_temporal",
            ClaimType::Otros => "otros",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "muerte" => Ok(ClaimType::Muerte),
            "invalidez" => Ok(ClaimType::Invalidez),
            "invalidez_parcial" => Ok(ClaimType::InvalidezParcial),
            "gastos_medicos" => Ok(ClaimType::GastosMedicos),
            "hospitalizacion" => Ok(ClaimType::Hospitalizacion),
            "incapacidad_temporal" => Ok(ClaimType::IncapacidadTemporal),
            "otros" => Ok(ClaimType::Otros),
            other => Err(CoreError::unknown_value("claim type", other)),
        }
    }
}

/// Input for reporting a loss
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClaim {
    pub claim_type: ClaimType,
    pub incident_date: NaiveDate,
    pub description: String,
    pub amount_claimed: Decimal,
    pub documents: Option<String>,
}

/// Edit through the dedicated update path
///
/// Every rule of the dedicated operations still applies: a status of
/// `aprobado` goes through [`Claim::approve`], `rechazado` through
/// [`Claim::reject`] and `pagado` through [`Claim::mark_paid`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimUpdate {
    pub status: Option<ClaimStatus>,
    pub amount_approved: Option<Decimal>,
    pub resolution: Option<String>,
    pub description: Option<String>,
    pub documents: Option<String>,
}

/// A claim against a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub policy_id: PolicyId,
    /// Claim number (human-readable, unique)
    pub claim_number: String,
    pub claim_type: ClaimType,
    /// Date of loss
    pub incident_date: NaiveDate,
    pub reported_at: DateTime<Utc>,
    pub description: String,
    pub amount_claimed: Decimal,
    pub amount_approved: Option<Decimal>,
    pub status: ClaimStatus,
    /// Free-text list of attached documents
    pub documents: Option<String>,
    pub resolution: Option<String>,
    pub resolution_date: Option<NaiveDate>,
}

impl Claim {
    /// Reports a loss against an active policy
    ///
    /// # Errors
    ///
    /// - `PolicyNotActive` unless the policy is `activa`
    /// - `Validation` for a non-positive amount, an empty description or an
    ///   incident date in the future
    pub fn report(policy: &Policy, new: NewClaim, claim_number: String) -> Result<Self, ClaimError> {
        if !policy.is_active() {
            return Err(ClaimError::PolicyNotActive(policy.status()));
        }
        if new.amount_claimed <= Decimal::ZERO {
            return Err(ClaimError::validation("claimed amount must be positive"));
        }
        if new.description.trim().is_empty() {
            return Err(ClaimError::validation("description is required"));
        }

        let now = Utc::now();
        if new.incident_date > now.date_naive() {
            return Err(ClaimError::validation("incident date cannot be in the future"));
        }

        Ok(Self {
            id: ClaimId::new_v7(),
            policy_id: policy.id(),
            claim_number,
            claim_type: new.claim_type,
            incident_date: new.incident_date,
            reported_at: now,
            description: new.description,
            amount_claimed: new.amount_claimed,
            amount_approved: None,
            status: ClaimStatus::Reported,
            documents: new.documents,
            resolution: None,
            resolution_date: None,
        })
    }

    /// Replaces the number after a uniqueness conflict; only before first save
    pub fn renumber(&mut self, claim_number: String) {
        self.claim_number = claim_number;
    }

    /// Moves a reported claim into review
    pub fn start_review(&mut self) -> Result<(), ClaimError> {
        self.move_open_to(ClaimStatus::UnderReview)
    }

    /// Approves the claim for `amount`
    ///
    /// Stamps `today` as the resolution date and uses the default approval
    /// text when no resolution is given.
    ///
    /// # Errors
    ///
    /// - `InvalidStatusTransition` unless the claim is still open
    /// - `ApprovedExceedsClaimed` if `amount` is above the claimed amount
    pub fn approve(
        &mut self,
        amount: Decimal,
        resolution: Option<String>,
        today: NaiveDate,
    ) -> Result<(), ClaimError> {
        self.ensure_open(ClaimStatus::Approved)?;
        self.check_approved_amount(amount)?;

        self.amount_approved = Some(amount);
        self.resolve(ClaimStatus::Approved, resolution, DEFAULT_APPROVAL_TEXT, today);
        Ok(())
    }

    /// Rejects the claim
    pub fn reject(&mut self, resolution: Option<String>, today: NaiveDate) -> Result<(), ClaimError> {
        self.ensure_open(ClaimStatus::Rejected)?;
        self.resolve(ClaimStatus::Rejected, resolution, DEFAULT_REJECTION_TEXT, today);
        Ok(())
    }

    /// Records the payout of an approved claim
    pub fn mark_paid(&mut self) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Approved {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status,
                to: ClaimStatus::Paid,
            });
        }
        self.status = ClaimStatus::Paid;
        Ok(())
    }

    /// Applies an edit; on error the claim is left untouched
    pub fn apply_update(&mut self, update: ClaimUpdate, today: NaiveDate) -> Result<(), ClaimError> {
        if self.status.is_closed() {
            return Err(ClaimError::ClaimClosed(self.status));
        }

        let mut next = self.clone();

        if let Some(description) = update.description {
            if description.trim().is_empty() {
                return Err(ClaimError::validation("description is required"));
            }
            next.description = description;
        }
        if let Some(documents) = update.documents {
            next.documents = Some(documents);
        }
        if let Some(amount) = update.amount_approved {
            next.check_approved_amount(amount)?;
            next.amount_approved = Some(amount);
        }
        if update.resolution.is_some() {
            next.resolution = update.resolution.clone();
        }

        match update.status {
            None => {}
            Some(target) if target == next.status => {}
            Some(ClaimStatus::Approved) => {
                let amount = next.amount_approved.ok_or_else(|| {
                    ClaimError::validation("an approved amount is required to approve a claim")
                })?;
                next.approve(amount, update.resolution, today)?;
            }
            Some(ClaimStatus::Rejected) => next.reject(update.resolution, today)?,
            Some(ClaimStatus::Paid) => next.mark_paid()?,
            Some(target) => next.move_open_to(target)?,
        }

        *self = next;
        Ok(())
    }

    fn check_approved_amount(&self, amount: Decimal) -> Result<(), ClaimError> {
        if amount <= Decimal::ZERO {
            return Err(ClaimError::validation("approved amount must be positive"));
        }
        if amount > self.amount_claimed {
            return Err(ClaimError::ApprovedExceedsClaimed {
                approved: amount,
                claimed: self.amount_claimed,
            });
        }
        Ok(())
    }

    fn ensure_open(&self, to: ClaimStatus) -> Result<(), ClaimError> {
        if !self.status.is_open() {
            return Err(ClaimError::InvalidStatusTransition { from: self.status, to });
        }
        Ok(())
    }

    fn move_open_to(&mut self, to: ClaimStatus) -> Result<(), ClaimError> {
        self.ensure_open(to)?;
        if !to.is_open() {
            return Err(ClaimError::InvalidStatusTransition { from: self.status, to });
        }
        self.status = to;
        Ok(())
    }

    fn resolve(&mut self, to: ClaimStatus, resolution: Option<String>, default: &str, today: NaiveDate) {
        self.status = to;
        self.resolution_date = Some(today);
        self.resolution = Some(
            resolution
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| default.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        for status in ClaimStatus::ALL {
            assert_eq!(status.as_str().parse::<ClaimStatus>().unwrap(), status);
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
    }

    #[test]
    fn test_claim_type_wire_names() {
        assert_eq!(
            serde_json::to_value(ClaimType::IncapacidadTemporal).unwrap(),
            "incapacidad_temporal"
        );
        assert_eq!("gastos_medicos".parse::<ClaimType>().unwrap(), ClaimType::GastosMedicos);
        assert!("robo".parse::<ClaimType>().is_err());
    }

    #[test]
    fn test_open_and_closed_partition() {
        for status in ClaimStatus::ALL {
            assert!(!(status.is_open() && status.is_closed()));
        }
        assert!(!ClaimStatus::Approved.is_open());
        assert!(!ClaimStatus::Approved.is_closed());
    }
}
