use async_trait::async_trait;
use innkeep_core::deposit::{DepositPayment, DepositPolicy};
use innkeep_core::repository::{DepositRepository, RepoResult, RepositoryError};
use innkeep_shared::types::{DepositPaymentId, StayId, TenantId};

use super::DocumentStore;

#[async_trait]
impl DepositRepository for DocumentStore {
    async fn list_policies(&self, tenant_id: TenantId) -> RepoResult<Vec<DepositPolicy>> {
        Ok(self.partition(tenant_id).await.deposit_policies.clone())
    }

    async fn insert_policy(&self, policy: DepositPolicy) -> RepoResult<DepositPolicy> {
        let mut part = self.partition(policy.tenant_id).await;
        let name = policy.name.trim();
        if part
            .deposit_policies
            .iter()
            .any(|p| p.id == policy.id || p.name.trim().eq_ignore_ascii_case(name))
        {
            return Err(RepositoryError::already_exists("deposit_policy", name));
        }
        part.deposit_policies.push(policy.clone());
        Ok(policy)
    }

    async fn get_payment(
        &self,
        tenant_id: TenantId,
        payment_id: DepositPaymentId,
    ) -> RepoResult<Option<DepositPayment>> {
        Ok(self.partition(tenant_id).await.deposit_payments.get(&payment_id).cloned())
    }

    async fn list_payments(&self, tenant_id: TenantId, stay_id: StayId) -> RepoResult<Vec<DepositPayment>> {
        let part = self.partition(tenant_id).await;
        let mut payments: Vec<DepositPayment> = part
            .deposit_payments
            .values()
            .filter(|p| p.stay_id == stay_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.received_at.cmp(&b.received_at).then(a.id.cmp(&b.id)));
        Ok(payments)
    }

    async fn save_payment(
        &self,
        mut payment: DepositPayment,
        expected_version: Option<u64>,
    ) -> RepoResult<DepositPayment> {
        let mut part = self.partition(payment.tenant_id).await;
        let current = part.deposit_payments.get(&payment.id).map(|p| p.version);
        payment.version = match (expected_version, current) {
            (None, None) => 1,
            (None, Some(_)) => return Err(RepositoryError::already_exists("deposit_payment", payment.id)),
            (Some(_), None) => return Err(RepositoryError::not_found("deposit_payment", payment.id)),
            (Some(expected), Some(found)) if expected == found => expected + 1,
            (Some(_), Some(_)) => return Err(RepositoryError::version_conflict("deposit_payment", payment.id)),
        };
        part.deposit_payments.insert(payment.id, payment.clone());
        Ok(payment)
    }
}
