//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about. Names, addresses and identifications are randomised with
//! `fake`, which keeps unique columns from clashing between tests.

use chrono::NaiveDate;
use fake::faker::address::en::StreetName;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;

use core_kernel::{AgentId, ClientId, ReferenceNumber};
use domain_billing::Invoice;
use domain_claims::{Claim, ClaimType, NewClaim};
use domain_party::{Agent, AgentProfile, Client, ClientProfile, PasswordHash, Role, User};
use domain_policy::{NewPolicy, Policy, PolicyStatus};

use crate::fixtures::{AmountFixtures, CredentialFixtures, DateFixtures};

fn random_username(prefix: &str) -> String {
    format!("{prefix}{}", (100_000..999_999u32).fake::<u32>())
}

fn random_identification() -> String {
    format!("CI-{}", (1_000_000..9_999_999u32).fake::<u32>())
}

/// Builds a user with a random name and the shared test password
pub fn build_user(role: Role) -> User {
    let prefix = match role {
        Role::Admin => "admin",
        Role::Agent => "agente",
        Role::Client => "cliente",
    };
    User::new(
        random_username(prefix),
        role,
        PasswordHash::derive(CredentialFixtures::password()),
    )
    .expect("generated username is not blank")
    .with_name(FirstName().fake::<String>(), LastName().fake::<String>())
}

/// Builder for client users with their profile
pub struct ClientBuilder {
    identification: String,
    birth_date: NaiveDate,
    active: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            identification: random_identification(),
            birth_date: DateFixtures::birth_date(),
            active: true,
        }
    }

    pub fn with_identification(mut self, identification: impl Into<String>) -> Self {
        self.identification = identification.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Client {
        let mut user = build_user(Role::Client);
        if !self.active {
            user.deactivate();
        }
        let address: String = StreetName().fake();
        let profile = ClientProfile::new(user.id, self.birth_date, address, self.identification)
            .expect("builder identification is not blank");
        Client::new(user, profile).expect("builder pairs a client user with its profile")
    }
}

/// An agent user with a generated code and the default commission
#[derive(Default)]
pub struct AgentBuilder;

impl AgentBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(self) -> Agent {
        let user = build_user(Role::Agent);
        let profile = AgentProfile::new(
            user.id,
            ReferenceNumber::AgentCode.generate(),
            DateFixtures::policy_start(),
        )
        .expect("generated agent code is not blank");
        Agent::new(user, profile).expect("builder pairs an agent user with its profile")
    }
}

/// Builder for policies in any lifecycle status
pub struct PolicyBuilder {
    client_id: ClientId,
    agent_id: Option<AgentId>,
    policy_number: String,
    status: PolicyStatus,
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self {
            client_id: ClientId::new(),
            agent_id: None,
            policy_number: ReferenceNumber::Policy.generate(),
            status: PolicyStatus::Quoting,
        }
    }

    pub fn for_client(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn with_agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn with_policy_number(mut self, number: impl Into<String>) -> Self {
        self.policy_number = number.into();
        self
    }

    /// Target status; reached through the aggregate's own transitions
    pub fn with_status(mut self, status: PolicyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Policy {
        let mut policy = Policy::quote(
            NewPolicy {
                client_id: self.client_id,
                agent_id: self.agent_id,
                insured_sum: AmountFixtures::insured_sum(),
                annual_premium: AmountFixtures::annual_premium(),
                monthly_premium: None,
                start_date: DateFixtures::policy_start(),
                end_date: DateFixtures::policy_end(),
                coverage: None,
            },
            self.policy_number,
        )
        .expect("builder terms are valid");

        match self.status {
            PolicyStatus::Quoting => {}
            PolicyStatus::PendingPayment => {
                let agent = self.agent_id.unwrap_or_default();
                policy.accept_solicitation(agent).expect("quoting policy accepts");
            }
            PolicyStatus::Active => policy.activate().expect("quoting policy activates"),
            PolicyStatus::Cancelled => policy.cancel().expect("quoting policy cancels"),
            PolicyStatus::Inactive => {
                policy.deactivate_for_client();
            }
            PolicyStatus::Expired => {
                // no transition leads here; restore from the record instead
                let mut record = policy.into_record();
                record.status = PolicyStatus::Expired;
                policy = Policy::restore(record);
            }
        }
        policy.take_events();
        policy
    }
}

/// A pending invoice for the policy's annual premium
pub fn build_invoice(policy: &Policy) -> Invoice {
    Invoice::with_due_window(
        policy.id(),
        ReferenceNumber::Invoice.generate(),
        policy.annual_premium(),
        DateFixtures::issue_date(),
        15,
    )
    .expect("annual premium is positive")
}

/// A freshly reported claim on an active policy
pub fn build_claim(policy: &Policy, amount: Decimal) -> Claim {
    Claim::report(
        policy,
        NewClaim {
            claim_type: ClaimType::GastosMedicos,
            incident_date: DateFixtures::incident_date(),
            description: "Internacion de emergencia".to_string(),
            amount_claimed: amount,
            documents: None,
        },
        ReferenceNumber::Claim.generate(),
    )
    .expect("policy is active and the amount is positive")
}
