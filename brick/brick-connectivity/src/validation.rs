//! Bond consistency checks.

use tracing::warn;

use crate::ids::ConnectionRef;
use crate::placement::Placement;
use crate::scene::Scene;
use crate::tolerance::Tolerances;

/// Result of checking every bond in a scene.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityValidation {
    /// Bonds whose counterpart does not point back (connection, counterpart).
    pub one_sided: Vec<(ConnectionRef, ConnectionRef)>,

    /// Bonds pointing at a connection that does not exist (connection, target).
    pub dangling: Vec<(ConnectionRef, ConnectionRef)>,

    /// Bonds joining two fields of the same kind or of the same brick.
    pub same_kind: Vec<(ConnectionRef, ConnectionRef)>,

    /// Mutual bonds whose connections no longer coincide.
    pub misaligned: Vec<(ConnectionRef, ConnectionRef)>,
}

impl ConnectivityValidation {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no issue was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.one_sided.is_empty() && self.dangling.is_empty() && self.same_kind.is_empty() && self.misaligned.is_empty()
    }

    /// Total number of issues.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.one_sided.len() + self.dangling.len() + self.same_kind.len() + self.misaligned.len()
    }

    /// One-line summary of the issues.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_valid() {
            return "Connectivity is valid".to_string();
        }

        let mut issues = Vec::new();
        for (count, label) in [
            (self.one_sided.len(), "one-sided bond(s)"),
            (self.dangling.len(), "dangling bond(s)"),
            (self.same_kind.len(), "incompatible bond(s)"),
            (self.misaligned.len(), "misaligned bond(s)"),
        ] {
            if count > 0 {
                issues.push(format!("{count} {label}"));
            }
        }
        format!("Validation failed: {}", issues.join(", "))
    }
}

impl Scene {
    /// Checks that every bond is mutual, points at a real connection, joins
    /// a connector to a receptor on different bricks, and still coincides.
    ///
    /// Mutual pairs are reported once.
    #[must_use]
    pub fn validate(&self, tolerance: &Tolerances) -> ConnectivityValidation {
        let mut result = ConnectivityValidation::new();
        let rest = Placement::at_rest();

        for field in self.fields() {
            for (index, other) in field.bonds() {
                let this = ConnectionRef::new(field.id(), index);
                if self.connection(other).is_none() {
                    result.dangling.push((this, other));
                    continue;
                }
                if self.connected_to(other) != Some(this) {
                    result.one_sided.push((this, other));
                    continue;
                }
                // Mutual: report from the lower side only
                if (other.field, other.index) < (this.field, this.index) {
                    continue;
                }
                let same_kind = self.field(other.field).is_some_and(|f| f.kind() == field.kind());
                let same_brick = self.field_owner(other.field) == self.field_owner(field.id());
                if same_kind || same_brick {
                    result.same_kind.push((this, other));
                } else if !self.is_connection_aligned(this, other, &rest, tolerance) {
                    result.misaligned.push((this, other));
                }
            }
        }

        if !result.is_valid() {
            warn!(issues = result.issue_count(), "{}", result.summary());
        }
        result
    }
}
