//! Closed status and category enums stored as TEXT columns.
//!
//! Each enum round-trips through its snake_case wire value: serde uses it for
//! JSON, the db crate binds [`as_str`](ProjectStatus::as_str) and decodes rows
//! through `TryFrom<String>`.

use serde::{Deserialize, Serialize};

/// Returned when a stored or submitted value is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// A `{ value, label }` pair for select inputs on create/edit pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: String,
}

/// Turn `closed_won` into `Closed Won`.
pub fn humanize(value: &str) -> String {
    value
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $val)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// The stored / wire value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Comma-separated list of accepted values, for error messages.
            pub fn expected() -> String {
                [$( $val ),+].join(", ")
            }

            /// Select options for form pages.
            pub fn options() -> Vec<SelectOption> {
                Self::ALL
                    .iter()
                    .map(|v| SelectOption {
                        value: v.as_str(),
                        label: humanize(v.as_str()),
                    })
                    .collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $( $val => Ok($name::$variant), )+
                    other => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

define_text_enum! {
    /// Sales pipeline stage of a lead.
    LeadStatus {
        New = "new",
        Contacted = "contacted",
        Qualified = "qualified",
        Proposal = "proposal",
        Negotiation = "negotiation",
        ClosedWon = "closed_won",
        ClosedLost = "closed_lost",
    }
}

define_text_enum! {
    /// Project approval workflow status. See [`crate::workflow`].
    ProjectStatus {
        Pending = "pending",
        InProgress = "in_progress",
        WaitingApproval = "waiting_approval",
        Approved = "approved",
        Rejected = "rejected",
        Completed = "completed",
    }
}

define_text_enum! {
    /// Customer account status.
    CustomerStatus {
        Active = "active",
        Suspended = "suspended",
        Terminated = "terminated",
    }
}

define_text_enum! {
    /// Subscription status of a customer service.
    ServiceStatus {
        Active = "active",
        Suspended = "suspended",
        Terminated = "terminated",
    }
}

define_text_enum! {
    /// Catalog product category.
    ProductType {
        Internet = "internet",
        CableTv = "cable_tv",
        Voip = "voip",
        DedicatedLine = "dedicated_line",
    }
}

define_text_enum! {
    /// How often a product is billed.
    BillingCycle {
        Monthly = "monthly",
        Yearly = "yearly",
    }
}

define_text_enum! {
    /// In-app notification kinds produced by the project workflow.
    NotificationKind {
        ApprovalRequested = "approval_requested",
        Approved = "approved",
        Rejected = "rejected",
    }
}

macro_rules! default_variant {
    ($( $name:ident => $variant:ident ),+ $(,)?) => {
        $(
            impl Default for $name {
                fn default() -> Self {
                    $name::$variant
                }
            }
        )+
    };
}

default_variant! {
    LeadStatus => New,
    ProjectStatus => Pending,
    CustomerStatus => Active,
    ServiceStatus => Active,
    BillingCycle => Monthly,
}
