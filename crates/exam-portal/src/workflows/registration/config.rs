use serde::{Deserialize, Serialize};

/// Tunables for the registration workflow: the exam fee surfaced to the
/// candidate and the simulated external-call latencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationConfig {
    pub exam_fee_inr: u32,
    /// UPI payee carried into the decorative payment QR payload.
    pub upi_payee: String,
    /// Simulated payment-verification latency.
    pub verification_delay_ms: u64,
    /// Hard ceiling on the verification suspension; a stalled call fails
    /// instead of hanging the session.
    pub verification_timeout_ms: u64,
    /// Simulated admit-card search latency.
    pub search_delay_ms: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            exam_fee_inr: 600,
            upi_payee: "examportal@ybl".to_string(),
            verification_delay_ms: 2_000,
            verification_timeout_ms: 10_000,
            search_delay_ms: 1_000,
        }
    }
}

impl RegistrationConfig {
    /// Zero-latency variant so tests never sleep.
    pub fn immediate() -> Self {
        Self {
            verification_delay_ms: 0,
            verification_timeout_ms: 1_000,
            search_delay_ms: 0,
            ..Self::default()
        }
    }

    /// UPI deep link rendered as the payment QR on the verification step.
    pub fn payment_qr_payload(&self) -> String {
        format!(
            "upi://pay?pa={}&am={}&cu=INR",
            self.upi_payee, self.exam_fee_inr
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_qr_carries_payee_and_fee() {
        let config = RegistrationConfig::default();
        assert_eq!(
            config.payment_qr_payload(),
            "upi://pay?pa=examportal@ybl&am=600&cu=INR"
        );
    }
}
