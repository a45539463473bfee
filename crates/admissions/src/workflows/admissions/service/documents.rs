use tracing::info;

use super::{guard, validated, AdmissionsService};
use crate::workflows::admissions::access::{Action, Actor, ResourceKind};
use crate::workflows::admissions::documents::{
    ensure_size_within_limit, storage_path, DocumentChecklist, DocumentRuleError,
};
use crate::workflows::admissions::domain::{ApplicationId, Document, DocumentId};
use crate::workflows::admissions::error::{AdmissionsError, StoreResultExt};
use crate::workflows::admissions::repository::AdmissionsStore;
use crate::workflows::admissions::requests::{UploadDocumentRequest, VerifyDocumentRequest};
use crate::workflows::admissions::views::DocumentView;

const NO_UPLOAD: &str = "You do not have permission to upload documents for this application";
const NO_ACCESS: &str = "You do not have access to these documents";

impl<S> AdmissionsService<S>
where
    S: AdmissionsStore + 'static,
{
    /// Records an uploaded file against an application. The bytes live elsewhere; only the
    /// metadata and the derived storage path are kept.
    pub fn upload_document(
        &self,
        actor: &Actor,
        request: UploadDocumentRequest,
    ) -> Result<DocumentView, AdmissionsError> {
        const OP: &str = "uploading document";
        validated(&request)?;

        let found = self.store.application(&request.application_id).or_fail(OP)?;
        let application = guard(
            actor,
            ResourceKind::Document,
            Action::Edit,
            found,
            NO_UPLOAD,
            |application| self.application_resource(ResourceKind::Document, application, OP),
        )?;

        ensure_size_within_limit(request.file_size)?;
        if self
            .store
            .document_by_file_name(&request.file_name)
            .or_fail(OP)?
            .is_some()
        {
            return Err(DocumentRuleError::DuplicateFileName.into());
        }
        if DocumentChecklist::from_documents(
            &self
                .store
                .documents_by_application(&application.id)
                .or_fail(OP)?,
        )
        .is_uploaded(request.document_type)
        {
            return Err(DocumentRuleError::DuplicateDocumentType(request.document_type).into());
        }

        let document = Document {
            id: DocumentId::new(),
            application_id: application.id,
            student_id: application.student_id,
            document_type: request.document_type,
            file_path: storage_path(application.id, request.document_type, &request.file_name),
            file_name: request.file_name,
            file_url: request.file_url,
            content_type: request.content_type,
            file_size: request.file_size,
            description: request.description,
            uploaded_at: self.now(),
            uploaded_by: actor.user_id,
            is_verified: false,
            verified_at: None,
            verified_by: None,
            verification_notes: None,
        };

        let document = self.store.insert_document(document).or_fail(OP)?;
        info!(
            document_id = %document.id,
            application_id = %application.id,
            document_type = document.document_type.label(),
            "document uploaded"
        );
        Ok(DocumentView::from(document))
    }

    pub fn verify_document(
        &self,
        actor: &Actor,
        id: DocumentId,
        request: VerifyDocumentRequest,
    ) -> Result<DocumentView, AdmissionsError> {
        const OP: &str = "verifying document";
        validated(&request)?;

        let found = self.store.document(&id).or_fail(OP)?;
        let mut document = guard(
            actor,
            ResourceKind::Document,
            Action::Review,
            found,
            "Only admissions staff can verify documents",
            |document| self.document_resource(document, OP),
        )?;

        document.is_verified = request.is_verified;
        document.verification_notes = request.notes;
        document.verified_at = Some(self.now());
        document.verified_by = Some(actor.user_id);
        self.store.update_document(document.clone()).or_fail(OP)?;
        info!(
            document_id = %document.id,
            verified = document.is_verified,
            "document verification recorded"
        );

        let documents = self
            .store
            .documents_by_application(&document.application_id)
            .or_fail(OP)?;
        if DocumentChecklist::from_documents(&documents).is_fully_verified() {
            info!(application_id = %document.application_id, "all application documents verified");
        }
        Ok(DocumentView::from(document))
    }

    pub fn documents_by_application(
        &self,
        actor: &Actor,
        application_id: ApplicationId,
    ) -> Result<Vec<DocumentView>, AdmissionsError> {
        const OP: &str = "loading documents";
        let found = self.store.application(&application_id).or_fail(OP)?;
        let application = guard(
            actor,
            ResourceKind::Document,
            Action::View,
            found,
            NO_ACCESS,
            |application| self.application_resource(ResourceKind::Document, application, OP),
        )?;
        Ok(self
            .store
            .documents_by_application(&application.id)
            .or_fail(OP)?
            .into_iter()
            .map(DocumentView::from)
            .collect())
    }
}
