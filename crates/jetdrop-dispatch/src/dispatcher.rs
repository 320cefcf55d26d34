//! Batch dispatcher: drives transfer jobs through submission.
//!
//! Two modes share one engine. Batched mode packs up to `batch_size`
//! transfers into a single external transaction and trusts acceptance as
//! confirmation. Sequential mode sends one transfer per transaction
//! through a signing collaborator, reading a fresh sequence number before
//! every send and cooling down between sends.

use std::time::Duration;

use jetdrop_client::{ChainReader, EndpointRotation, ExternalTransaction, OutgoingMessage, TransferSubmitter};
use jetdrop_primitives::{Address, TokenAmount};
use tracing::{debug, info, warn};

use crate::batch::DEFAULT_BATCH_SIZE;
use crate::error::{DispatchError, Result};
use crate::job::{JobState, TransferJob};
use crate::payload::TransferPayload;
use crate::report::DispatchReport;
use crate::retry::{RetryPolicy, run_with_retry};
use crate::session::DispatchSession;

/// Gas attached to each transfer message in batched mode, 0.05 units.
pub const TRANSFER_GAS_NANO: u128 = 50_000_000;
/// Notification value forwarded to the recipient in batched mode, 0.01.
pub const FORWARD_VALUE_NANO: u128 = 10_000_000;
/// Gas per transfer on the sequential signing path, 0.08 units.
pub const SEQUENTIAL_GAS_NANO: u128 = 80_000_000;
/// Forwarded notification value on the sequential path, 0.02 units.
pub const SEQUENTIAL_FORWARD_NANO: u128 = 20_000_000;

/// Seconds an outgoing transaction stays valid for submission.
pub const TRANSFER_VALIDITY_SECS: u64 = 300;

/// What the caller wants after a job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchDecision {
    /// Leave the failed job behind and move on to the next one.
    Continue,
    /// Stop the run; unattempted jobs are marked skipped.
    Abort,
}

/// Context handed to the decision hook when a job or batch fails.
///
/// In batched mode `recipient` names the first unsettled recipient of
/// the failed batch.
#[derive(Debug)]
pub struct JobFailure<'a> {
    pub batch_number: usize,
    pub recipient: Address,
    pub attempts: u32,
    pub error: &'a DispatchError,
}

/// Tunable knobs of a dispatch run.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub batch_size: usize,
    /// Pause after each accepted sequential send.
    pub job_cooldown: Duration,
    /// Longer pause after a failed job when the caller continues.
    pub failure_cooldown: Duration,
    pub validity_window_secs: u64,
    /// Retry policy for read calls such as sequence-number lookups.
    pub read_retry: RetryPolicy,
    /// Retry policy for transaction submission.
    pub send_retry: RetryPolicy,
    /// Value attached to each transfer message.
    pub gas_value: TokenAmount,
    /// Value forwarded to the recipient for the transfer notification.
    pub forward_value: TokenAmount,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            job_cooldown: Duration::from_secs(5),
            failure_cooldown: Duration::from_secs(8),
            validity_window_secs: TRANSFER_VALIDITY_SECS,
            read_retry: RetryPolicy::default(),
            send_retry: RetryPolicy::sends(),
            gas_value: TokenAmount::from_nano(TRANSFER_GAS_NANO),
            forward_value: TokenAmount::from_nano(FORWARD_VALUE_NANO),
        }
    }
}

impl DispatchConfig {
    /// Preset for the sequential signing path: one job per transaction
    /// and higher attach values, since the signer pays forwarding fees
    /// that a wallet session would otherwise batch.
    pub fn sequential() -> Self {
        DispatchConfig {
            batch_size: 1,
            gas_value: TokenAmount::from_nano(SEQUENTIAL_GAS_NANO),
            forward_value: TokenAmount::from_nano(SEQUENTIAL_FORWARD_NANO),
            ..DispatchConfig::default()
        }
    }
}

/// Drives a [`DispatchSession`] against the network collaborators.
///
/// `C` rotates RPC endpoints under rate limiting, `R` answers chain
/// queries, `S` accepts transaction envelopes. All three are usually the
/// same [`jetdrop_client::RpcClient`] plus a wallet bridge; tests swap in
/// doubles.
pub struct BatchDispatcher<'a, C, R, S> {
    client: &'a C,
    reader: &'a R,
    submitter: &'a S,
    config: DispatchConfig,
}

impl<'a, C, R, S> BatchDispatcher<'a, C, R, S>
where
    C: EndpointRotation,
    R: ChainReader,
    S: TransferSubmitter,
{
    pub fn new(client: &'a C, reader: &'a R, submitter: &'a S, config: DispatchConfig) -> Self {
        BatchDispatcher {
            client,
            reader,
            submitter,
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Resolves the sender's token sub-account under `registry` with the
    /// read retry policy.
    async fn sender_token_wallet(&self, sender: &Address, registry: &Address) -> Result<Address> {
        run_with_retry(
            &self.config.read_retry,
            self.client,
            "derive sender token wallet",
            || self.reader.derived_wallet_address(sender, registry),
        )
        .await
    }

    fn transfer_message(
        &self,
        token_wallet: &Address,
        sender: &Address,
        job: &TransferJob,
    ) -> OutgoingMessage {
        let payload = TransferPayload::new(
            job.amount,
            job.recipient,
            *sender,
            self.config.forward_value,
        );
        OutgoingMessage::transfer(*token_wallet, self.config.gas_value)
            .with_payload(payload.to_bytes())
    }

    /// Submits each batch as one multi-message transaction.
    ///
    /// Acceptance of the envelope confirms every job in the batch. When a
    /// batch fails, `decide` picks between carrying on with the next batch
    /// and aborting the run. Jobs already confirmed from an earlier pass
    /// are never sent again.
    pub async fn dispatch_batched(
        &self,
        session: &mut DispatchSession,
        sender: &Address,
        registry: &Address,
        decide: &mut dyn FnMut(&JobFailure<'_>) -> DispatchDecision,
    ) -> Result<DispatchReport> {
        let token_wallet = self.sender_token_wallet(sender, registry).await?;
        info!(
            session = %session.id(),
            batches = session.batch_count(),
            jobs = session.job_count(),
            token_wallet = %token_wallet,
            "dispatching batched transfers"
        );

        let mut aborted = false;
        for index in 0..session.batch_count() {
            if aborted {
                for job in session.batch_mut(index).jobs.iter_mut() {
                    if !job.is_confirmed() {
                        job.mark_skipped();
                    }
                }
                continue;
            }

            let batch = &session.batches()[index];
            let batch_number = batch.number;
            if batch.jobs.iter().all(TransferJob::is_confirmed) {
                continue;
            }
            let first_unsettled = batch
                .jobs
                .iter()
                .find(|job| !job.is_confirmed())
                .map(|job| job.recipient);
            let messages: Vec<OutgoingMessage> = batch
                .jobs
                .iter()
                .filter(|job| !job.is_confirmed())
                .map(|job| self.transfer_message(&token_wallet, sender, job))
                .collect();
            let pending = messages.len();
            let transaction =
                ExternalTransaction::with_window(self.config.validity_window_secs, messages);

            for job in session.batch_mut(index).jobs.iter_mut() {
                if !job.is_confirmed() {
                    job.mark_sent();
                }
            }

            let mut attempts = 0u32;
            let outcome = run_with_retry(
                &self.config.send_retry,
                self.client,
                "submit transfer batch",
                || {
                    attempts += 1;
                    self.submitter.submit(&transaction)
                },
            )
            .await;

            match outcome {
                Ok(()) => {
                    for job in session.batch_mut(index).jobs.iter_mut() {
                        if job.state == JobState::Sent {
                            job.attempts = attempts;
                            job.mark_confirmed();
                        }
                    }
                    session.record_confirmed(pending);
                    info!(
                        session = %session.id(),
                        batch = batch_number,
                        jobs = pending,
                        "batch accepted"
                    );
                }
                Err(error) => {
                    for job in session.batch_mut(index).jobs.iter_mut() {
                        if job.state == JobState::Sent {
                            job.attempts = attempts;
                            job.mark_failed(error.to_string());
                        }
                    }
                    warn!(
                        session = %session.id(),
                        batch = batch_number,
                        error = %error,
                        "batch failed"
                    );
                    let failure = JobFailure {
                        batch_number,
                        recipient: first_unsettled.unwrap_or(*sender),
                        attempts,
                        error: &error,
                    };
                    if decide(&failure) == DispatchDecision::Abort {
                        aborted = true;
                    }
                }
            }
        }

        Ok(DispatchReport::compile(session, aborted))
    }

    /// Sends one transfer per transaction through the signing collaborator.
    ///
    /// A fresh sequence number is read before every send and recorded on
    /// the envelope; the session cursor rejects regressions. After each
    /// accepted send the dispatcher cools down for `job_cooldown`, and for
    /// `failure_cooldown` after a failure the caller decided to skip.
    pub async fn dispatch_sequential(
        &self,
        session: &mut DispatchSession,
        sender: &Address,
        registry: &Address,
        decide: &mut dyn FnMut(&JobFailure<'_>) -> DispatchDecision,
    ) -> Result<DispatchReport> {
        let token_wallet = self.sender_token_wallet(sender, registry).await?;
        info!(
            session = %session.id(),
            jobs = session.job_count(),
            token_wallet = %token_wallet,
            "dispatching sequential transfers"
        );

        let mut aborted = false;
        for b in 0..session.batch_count() {
            for j in 0..session.batches()[b].len() {
                if session.batches()[b].jobs[j].is_confirmed() {
                    continue;
                }
                if aborted {
                    session.batch_mut(b).jobs[j].mark_skipped();
                    continue;
                }

                let batch_number = session.batches()[b].number;
                let (recipient, amount) = {
                    let job = &session.batches()[b].jobs[j];
                    (job.recipient, job.amount)
                };

                let sequence = match run_with_retry(
                    &self.config.read_retry,
                    self.client,
                    "read sender sequence number",
                    || self.reader.sequence_number(sender),
                )
                .await
                {
                    Ok(sequence) => sequence,
                    Err(error) => {
                        let job = &mut session.batch_mut(b).jobs[j];
                        job.mark_failed(error.to_string());
                        warn!(
                            session = %session.id(),
                            recipient = %recipient,
                            error = %error,
                            "sequence read failed"
                        );
                        let failure = JobFailure {
                            batch_number,
                            recipient,
                            attempts: 0,
                            error: &error,
                        };
                        if decide(&failure) == DispatchDecision::Abort {
                            aborted = true;
                        } else {
                            tokio::time::sleep(self.config.failure_cooldown).await;
                        }
                        continue;
                    }
                };
                session.advance_sequence(sequence)?;

                let payload =
                    TransferPayload::new(amount, recipient, *sender, self.config.forward_value);
                let message = OutgoingMessage::transfer(token_wallet, self.config.gas_value)
                    .with_payload(payload.to_bytes());
                let transaction =
                    ExternalTransaction::with_window(self.config.validity_window_secs, vec![message])
                        .with_sequence_number(sequence);

                session.batch_mut(b).jobs[j].mark_sent();
                let mut attempts = 0u32;
                let outcome = run_with_retry(
                    &self.config.send_retry,
                    self.client,
                    "submit transfer",
                    || {
                        attempts += 1;
                        self.submitter.submit(&transaction)
                    },
                )
                .await;

                let job = &mut session.batch_mut(b).jobs[j];
                job.attempts = attempts;
                match outcome {
                    Ok(()) => {
                        job.mark_confirmed();
                        session.record_confirmed(1);
                        debug!(
                            session = %session.id(),
                            recipient = %recipient,
                            sequence,
                            "transfer accepted"
                        );
                        tokio::time::sleep(self.config.job_cooldown).await;
                    }
                    Err(error) => {
                        job.mark_failed(error.to_string());
                        warn!(
                            session = %session.id(),
                            recipient = %recipient,
                            attempts,
                            error = %error,
                            "transfer failed"
                        );
                        let failure = JobFailure {
                            batch_number,
                            recipient,
                            attempts,
                            error: &error,
                        };
                        if decide(&failure) == DispatchDecision::Abort {
                            aborted = true;
                        } else {
                            tokio::time::sleep(self.config.failure_cooldown).await;
                        }
                    }
                }
            }
        }

        Ok(DispatchReport::compile(session, aborted))
    }
}
