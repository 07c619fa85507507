use super::{Extractor, ProviderKind};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;

/// Build metadata exported by Azure Pipelines agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AzurePipelinesMetadata {
    #[serde(rename = ":build_buildid", skip_serializing_if = "String::is_empty")]
    build_id: String,
    #[serde(rename = ":build_buildnumber", skip_serializing_if = "String::is_empty")]
    build_number: String,
    #[serde(rename = ":build_builduri")]
    build_uri: String,
    #[serde(
        rename = ":build_binariesdirectory",
        skip_serializing_if = "String::is_empty"
    )]
    binaries_directory: String,
    #[serde(rename = ":build_containerid", skip_serializing_if = "String::is_empty")]
    container_id: String,
    #[serde(
        rename = ":build_definitionname",
        skip_serializing_if = "String::is_empty"
    )]
    definition_name: String,
    #[serde(
        rename = ":build_definitionversion",
        skip_serializing_if = "String::is_empty"
    )]
    definition_version: String,
    #[serde(rename = ":build_queuedby", skip_serializing_if = "String::is_empty")]
    queued_by: String,
    #[serde(rename = ":build_queuedbyid", skip_serializing_if = "String::is_empty")]
    queued_by_id: String,
    #[serde(rename = ":build_reason", skip_serializing_if = "String::is_empty")]
    reason: String,
    #[serde(
        rename = ":build_repository_clean",
        skip_serializing_if = "String::is_empty"
    )]
    repository_clean: String,
    #[serde(
        rename = ":build_repository_localpath",
        skip_serializing_if = "String::is_empty"
    )]
    repository_local_path: String,
    #[serde(
        rename = ":build_repository_id",
        skip_serializing_if = "String::is_empty"
    )]
    repository_id: String,
    #[serde(rename = ":build_repository_name")]
    repository_name: String,
    #[serde(
        rename = ":build_repository_provider",
        skip_serializing_if = "String::is_empty"
    )]
    repository_provider: String,
    #[serde(
        rename = ":build_repository_tfvc_workspace",
        skip_serializing_if = "String::is_empty"
    )]
    repository_tfvc_workspace: String,
    #[serde(
        rename = ":build_repository_uri",
        skip_serializing_if = "String::is_empty"
    )]
    repository_uri: String,
    #[serde(
        rename = ":build_requestedforemail",
        skip_serializing_if = "String::is_empty"
    )]
    requested_for_email: String,
    #[serde(
        rename = ":build_requestedforid",
        skip_serializing_if = "String::is_empty"
    )]
    requested_for_id: String,
    #[serde(rename = ":build_sourcebranch", skip_serializing_if = "String::is_empty")]
    source_branch: String,
    #[serde(rename = ":build_sourcebranchname")]
    source_branch_name: String,
    #[serde(
        rename = ":build_sourcesdirectory",
        skip_serializing_if = "String::is_empty"
    )]
    sources_directory: String,
    #[serde(rename = ":build_sourceversion")]
    source_version: String,
    #[serde(
        rename = ":build_sourceversionmessage",
        skip_serializing_if = "String::is_empty"
    )]
    source_version_message: String,
    #[serde(
        rename = ":build_stagingdirectory",
        skip_serializing_if = "String::is_empty"
    )]
    staging_directory: String,
    #[serde(
        rename = ":build_repository_git_submodulecheckout",
        skip_serializing_if = "String::is_empty"
    )]
    repository_git_submodule_checkout: String,
    #[serde(
        rename = ":build_sourcetfvcshelveset",
        skip_serializing_if = "String::is_empty"
    )]
    source_tfvc_shelveset: String,
    #[serde(rename = ":system_teamfoundationcollectionuri")]
    team_foundation_collection_uri: String,
    #[serde(
        rename = ":build_triggeredby_buildid",
        skip_serializing_if = "String::is_empty"
    )]
    triggered_by_build_id: String,
    #[serde(
        rename = ":build_triggeredby_definitionid",
        skip_serializing_if = "String::is_empty"
    )]
    triggered_by_definition_id: String,
    #[serde(
        rename = ":build_triggeredby_definitionname",
        skip_serializing_if = "String::is_empty"
    )]
    triggered_by_definition_name: String,
    #[serde(
        rename = ":build_triggeredby_buildnumber",
        skip_serializing_if = "String::is_empty"
    )]
    triggered_by_build_number: String,
    #[serde(
        rename = ":build_triggeredby_projectid",
        skip_serializing_if = "String::is_empty"
    )]
    triggered_by_project_id: String,

    #[serde(skip)]
    nwo: String,
}

impl Extractor for AzurePipelinesMetadata {
    const KIND: ProviderKind = ProviderKind::AzurePipelines;
    const COMMIT_VARIABLE: &'static str = "BUILD_SOURCEVERSION";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::text("BUILD_BUILDID", |m: &mut Self| &mut m.build_id),
        EnvVar::text("BUILD_BUILDNUMBER", |m: &mut Self| &mut m.build_number),
        EnvVar::text("BUILD_BUILDURI", |m: &mut Self| &mut m.build_uri),
        EnvVar::text("BUILD_BINARIESDIRECTORY", |m: &mut Self| {
            &mut m.binaries_directory
        }),
        EnvVar::text("BUILD_CONTAINERID", |m: &mut Self| &mut m.container_id),
        EnvVar::text("BUILD_DEFINITIONNAME", |m: &mut Self| &mut m.definition_name),
        EnvVar::text("BUILD_DEFINITIONVERSION", |m: &mut Self| {
            &mut m.definition_version
        }),
        EnvVar::text("BUILD_QUEUEDBY", |m: &mut Self| &mut m.queued_by),
        EnvVar::text("BUILD_QUEUEDBYID", |m: &mut Self| &mut m.queued_by_id),
        EnvVar::text("BUILD_REASON", |m: &mut Self| &mut m.reason),
        EnvVar::text("BUILD_REPOSITORY_CLEAN", |m: &mut Self| &mut m.repository_clean),
        EnvVar::text("BUILD_REPOSITORY_LOCALPATH", |m: &mut Self| {
            &mut m.repository_local_path
        }),
        EnvVar::text("BUILD_REPOSITORY_ID", |m: &mut Self| &mut m.repository_id),
        EnvVar::text("BUILD_REPOSITORY_NAME", |m: &mut Self| &mut m.repository_name),
        EnvVar::text("BUILD_REPOSITORY_PROVIDER", |m: &mut Self| {
            &mut m.repository_provider
        }),
        EnvVar::text("BUILD_REPOSITORY_TFVC_WORKSPACE", |m: &mut Self| {
            &mut m.repository_tfvc_workspace
        }),
        EnvVar::text("BUILD_REPOSITORY_URI", |m: &mut Self| &mut m.repository_uri),
        EnvVar::text("BUILD_REQUESTEDFOREMAIL", |m: &mut Self| {
            &mut m.requested_for_email
        }),
        EnvVar::text("BUILD_REQUESTEDFORID", |m: &mut Self| &mut m.requested_for_id),
        EnvVar::text("BUILD_SOURCEBRANCH", |m: &mut Self| &mut m.source_branch),
        EnvVar::text("BUILD_SOURCEBRANCHNAME", |m: &mut Self| {
            &mut m.source_branch_name
        }),
        EnvVar::text("BUILD_SOURCESDIRECTORY", |m: &mut Self| {
            &mut m.sources_directory
        }),
        EnvVar::text("BUILD_SOURCEVERSION", |m: &mut Self| &mut m.source_version),
        EnvVar::text("BUILD_SOURCEVERSIONMESSAGE", |m: &mut Self| {
            &mut m.source_version_message
        }),
        EnvVar::text("BUILD_STAGINGDIRECTORY", |m: &mut Self| {
            &mut m.staging_directory
        }),
        EnvVar::text("BUILD_REPOSITORY_GIT_SUBMODULECHECKOUT", |m: &mut Self| {
            &mut m.repository_git_submodule_checkout
        }),
        EnvVar::text("BUILD_SOURCETFVCSHELVESET", |m: &mut Self| {
            &mut m.source_tfvc_shelveset
        }),
        EnvVar::text("SYSTEM_TEAMFOUNDATIONCOLLECTIONURI", |m: &mut Self| {
            &mut m.team_foundation_collection_uri
        }),
        EnvVar::text("BUILD_TRIGGEREDBY_BUILDID", |m: &mut Self| {
            &mut m.triggered_by_build_id
        }),
        EnvVar::text("BUILD_TRIGGEREDBY_DEFINITIONID", |m: &mut Self| {
            &mut m.triggered_by_definition_id
        }),
        EnvVar::text("BUILD_TRIGGEREDBY_DEFINITIONNAME", |m: &mut Self| {
            &mut m.triggered_by_definition_name
        }),
        EnvVar::text("BUILD_TRIGGEREDBY_BUILDNUMBER", |m: &mut Self| {
            &mut m.triggered_by_build_number
        }),
        EnvVar::text("BUILD_TRIGGEREDBY_PROJECTID", |m: &mut Self| {
            &mut m.triggered_by_project_id
        }),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        self.nwo = if self.repository_name.contains('/') {
            self.repository_name.clone()
        } else {
            format!(
                "{}/{}",
                self.team_foundation_collection_uri, self.repository_name
            )
        };
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.source_branch_name
    }

    fn build_url(&self) -> &str {
        &self.build_uri
    }

    fn commit_sha(&self) -> &str {
        &self.source_version
    }

    fn repo_name_with_owner(&self) -> &str {
        &self.nwo
    }
}
