//! Transactional session logon bridge for FTP-style protocol layers

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::FtpConfig;
use crate::error::Result;
use crate::identity::{ClientIdentity, LogonKind};
use crate::services::{AuthenticationService, AuthorityService, TransactionService};

/// Logon decision point consumed by the FTP protocol layer.
///
/// Non-guest logons run inside a transaction: credential verification,
/// then the administrator-authority check, then commit. The outcome is a
/// plain boolean; no error crosses this boundary.
pub struct FtpLogonBridge {
    auth: Arc<dyn AuthenticationService>,
    authority: Arc<dyn AuthorityService>,
    transactions: Arc<dyn TransactionService>,
    anonymous_account: String,
}

impl FtpLogonBridge {
    /// Builds a bridge over the injected services.
    pub fn new(
        auth: Arc<dyn AuthenticationService>,
        authority: Arc<dyn AuthorityService>,
        transactions: Arc<dyn TransactionService>,
        config: &FtpConfig,
    ) -> Self {
        Self {
            auth,
            authority,
            transactions,
            anonymous_account: config.anonymous_account.clone(),
        }
    }

    /// Authenticates one session logon.
    ///
    /// A guest-flagged identity short-circuits to a guest token with no
    /// credential check. On success the identity is updated in place with
    /// the logon classification and the captured authentication token.
    pub fn authenticate(&self, identity: &mut ClientIdentity) -> bool {
        if identity.is_guest() {
            return self.guest_logon(identity);
        }

        match self.transactional_logon(identity) {
            Ok((kind, token)) => {
                identity.set_logon_kind(kind);
                identity.set_auth_token(&token);
                debug!(user = %identity.user(), kind = %kind, "logon accepted");
                true
            }
            Err(err) => {
                warn!(user = %identity.user(), error = %err, "logon rejected");
                false
            }
        }
    }

    fn guest_logon(&self, identity: &mut ClientIdentity) -> bool {
        match self.auth.authenticate_guest(&self.anonymous_account) {
            Ok(token) => {
                identity.set_logon_kind(LogonKind::Guest);
                identity.set_auth_token(&token);
                debug!(
                    user = %identity.user(),
                    account = %self.anonymous_account,
                    "guest logon accepted"
                );
                true
            }
            Err(err) => {
                warn!(user = %identity.user(), error = %err, "guest logon rejected");
                false
            }
        }
    }

    /// Runs the credential check and authority upgrade inside one
    /// transaction. A commit failure is the authoritative outcome; a
    /// rollback failure is logged and never masks the original error.
    fn transactional_logon(&self, identity: &ClientIdentity) -> Result<(LogonKind, String)> {
        let transaction = self.transactions.begin()?;

        match self.verify_and_classify(identity) {
            Ok(outcome) => {
                transaction.commit()?;
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = transaction.rollback() {
                    warn!(
                        user = %identity.user(),
                        error = %rollback_err,
                        "rollback failed after logon error"
                    );
                }
                Err(err)
            }
        }
    }

    fn verify_and_classify(&self, identity: &ClientIdentity) -> Result<(LogonKind, String)> {
        let token = self
            .auth
            .authenticate(identity.user(), identity.password())?;

        let mut kind = LogonKind::Normal;
        if self.authority.has_admin_authority(identity.user())? {
            kind = LogonKind::Administrator;
        }

        Ok((kind, token))
    }
}
