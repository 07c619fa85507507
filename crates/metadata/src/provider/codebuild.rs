use super::{Extractor, ProviderKind, is_zero};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;
use tracing::warn;
use url::Url;

/// Build metadata exported by AWS CodeBuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AwsCodeBuildMetadata {
    #[serde(rename = ":aws_default_region", skip_serializing_if = "String::is_empty")]
    default_region: String,
    #[serde(rename = ":aws_region", skip_serializing_if = "String::is_empty")]
    region: String,
    #[serde(
        rename = ":codebuild_batch_build_identifier",
        skip_serializing_if = "String::is_empty"
    )]
    batch_build_identifier: String,
    #[serde(rename = ":codebuild_build_arn", skip_serializing_if = "String::is_empty")]
    build_arn: String,
    #[serde(rename = ":codebuild_build_id", skip_serializing_if = "String::is_empty")]
    build_id: String,
    #[serde(rename = ":codebuild_build_image", skip_serializing_if = "String::is_empty")]
    build_image: String,
    #[serde(rename = ":codebuild_build_number", skip_serializing_if = "is_zero")]
    build_number: u64,
    #[serde(rename = ":codebuild_build_succeeding", skip_serializing_if = "is_zero")]
    build_succeeding: u32,
    #[serde(rename = ":codebuild_initiator", skip_serializing_if = "String::is_empty")]
    initiator: String,
    #[serde(rename = ":codebuild_kms_key_id", skip_serializing_if = "String::is_empty")]
    kms_key_id: String,
    #[serde(rename = ":codebuild_log_path", skip_serializing_if = "String::is_empty")]
    log_path: String,
    #[serde(rename = ":codebuild_public_build_url")]
    public_build_url: String,
    #[serde(rename = ":codebuild_resolved_source_version")]
    resolved_source_version: String,
    #[serde(
        rename = ":codebuild_source_repo_url",
        skip_serializing_if = "String::is_empty"
    )]
    source_repo_url: String,
    #[serde(rename = ":codebuild_source_version")]
    source_version: String,
    #[serde(rename = ":codebuild_src_dir", skip_serializing_if = "String::is_empty")]
    src_dir: String,
    #[serde(rename = ":codebuild_start_time", skip_serializing_if = "String::is_empty")]
    start_time: String,
    #[serde(
        rename = ":codebuild_webhook_actor_account_id",
        skip_serializing_if = "String::is_empty"
    )]
    webhook_actor_account_id: String,
    #[serde(
        rename = ":codebuild_webhook_base_ref",
        skip_serializing_if = "String::is_empty"
    )]
    webhook_base_ref: String,
    #[serde(
        rename = ":codebuild_webhook_event",
        skip_serializing_if = "String::is_empty"
    )]
    webhook_event: String,
    #[serde(
        rename = ":codebuild_webhook_merge_commit",
        skip_serializing_if = "String::is_empty"
    )]
    webhook_merge_commit: String,
    #[serde(
        rename = ":codebuild_webhook_prev_commit",
        skip_serializing_if = "String::is_empty"
    )]
    webhook_prev_commit: String,
    #[serde(
        rename = ":codebuild_webhook_head_ref",
        skip_serializing_if = "String::is_empty"
    )]
    webhook_head_ref: String,
    #[serde(
        rename = ":codebuild_webhook_trigger",
        skip_serializing_if = "String::is_empty"
    )]
    webhook_trigger: String,

    #[serde(skip)]
    nwo: String,
}

impl Extractor for AwsCodeBuildMetadata {
    const KIND: ProviderKind = ProviderKind::AwsCodeBuild;
    const COMMIT_VARIABLE: &'static str = "CODEBUILD_RESOLVED_SOURCE_VERSION";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::text("AWS_DEFAULT_REGION", |m: &mut Self| &mut m.default_region),
        EnvVar::text("AWS_REGION", |m: &mut Self| &mut m.region),
        EnvVar::text("CODEBUILD_BATCH_BUILD_IDENTIFIER", |m: &mut Self| {
            &mut m.batch_build_identifier
        }),
        EnvVar::text("CODEBUILD_BUILD_ARN", |m: &mut Self| &mut m.build_arn),
        EnvVar::text("CODEBUILD_BUILD_ID", |m: &mut Self| &mut m.build_id),
        EnvVar::text("CODEBUILD_BUILD_IMAGE", |m: &mut Self| &mut m.build_image),
        EnvVar::uint64("CODEBUILD_BUILD_NUMBER", |m: &mut Self| &mut m.build_number),
        EnvVar::uint32("CODEBUILD_BUILD_SUCCEEDING", |m: &mut Self| {
            &mut m.build_succeeding
        }),
        EnvVar::text("CODEBUILD_INITIATOR", |m: &mut Self| &mut m.initiator),
        EnvVar::text("CODEBUILD_KMS_KEY_ID", |m: &mut Self| &mut m.kms_key_id),
        EnvVar::text("CODEBUILD_LOG_PATH", |m: &mut Self| &mut m.log_path),
        EnvVar::text("CODEBUILD_PUBLIC_BUILD_URL", |m: &mut Self| {
            &mut m.public_build_url
        }),
        EnvVar::text("CODEBUILD_RESOLVED_SOURCE_VERSION", |m: &mut Self| {
            &mut m.resolved_source_version
        }),
        EnvVar::text("CODEBUILD_SOURCE_REPO_URL", |m: &mut Self| {
            &mut m.source_repo_url
        }),
        EnvVar::text("CODEBUILD_SOURCE_VERSION", |m: &mut Self| {
            &mut m.source_version
        }),
        EnvVar::text("CODEBUILD_SRC_DIR", |m: &mut Self| &mut m.src_dir),
        EnvVar::text("CODEBUILD_START_TIME", |m: &mut Self| &mut m.start_time),
        EnvVar::text("CODEBUILD_WEBHOOK_ACTOR_ACCOUNT_ID", |m: &mut Self| {
            &mut m.webhook_actor_account_id
        }),
        EnvVar::text("CODEBUILD_WEBHOOK_BASE_REF", |m: &mut Self| {
            &mut m.webhook_base_ref
        }),
        EnvVar::text("CODEBUILD_WEBHOOK_EVENT", |m: &mut Self| &mut m.webhook_event),
        EnvVar::text("CODEBUILD_WEBHOOK_MERGE_COMMIT", |m: &mut Self| {
            &mut m.webhook_merge_commit
        }),
        EnvVar::text("CODEBUILD_WEBHOOK_PREV_COMMIT", |m: &mut Self| {
            &mut m.webhook_prev_commit
        }),
        EnvVar::text("CODEBUILD_WEBHOOK_HEAD_REF", |m: &mut Self| {
            &mut m.webhook_head_ref
        }),
        EnvVar::text("CODEBUILD_WEBHOOK_TRIGGER", |m: &mut Self| {
            &mut m.webhook_trigger
        }),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        self.nwo = owner_and_repo(&self.public_build_url).unwrap_or_else(|| {
            warn!(
                url = %self.public_build_url,
                "Unable to derive repository name-with-owner from CodeBuild build URL"
            );
            String::new()
        });
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.source_version
    }

    fn build_url(&self) -> &str {
        &self.public_build_url
    }

    fn commit_sha(&self) -> &str {
        &self.resolved_source_version
    }

    fn repo_name_with_owner(&self) -> &str {
        &self.nwo
    }
}

/// Reads `owner/repo` from the first two path segments of `raw`.
fn owner_and_repo(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let mut segments = url.path_segments()?;
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let repo = segments.next().filter(|s| !s.is_empty())?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Some(format!("{owner}/{repo}"))
}
