//! Organization validation

use log::debug;

use super::context::{CallFailure, ScrapeContext};
use crate::client::GitProviderApi;
use crate::client::models::Organization;
use crate::error::{ApiError, Error, ScrapeError};

/// Confirm that `login` exists before anything is collected.
pub async fn validate_org<C>(
    client: &C,
    ctx: &ScrapeContext,
    login: &str,
) -> Result<Organization, ScrapeError>
where
    C: GitProviderApi + ?Sized,
{
    match ctx.call(client.resolve_owner(login)).await {
        Ok(Some(org)) => {
            debug!("Resolved {} as {:?}", org.login, org.kind);
            Ok(org)
        }
        Ok(None) | Err(CallFailure::Api(Error::Api(ApiError::NotFound(_)))) => {
            Err(ScrapeError::OrgNotFound(login.to_string()))
        }
        Err(failure) => Err(ScrapeError::OrgValidation(failure.to_string())),
    }
}
