use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{ApplicationId, Document, DocumentType};

/// Documents every application needs before it counts as complete.
pub const REQUIRED_DOCUMENT_TYPES: [DocumentType; 3] = [
    DocumentType::BirthCertificate,
    DocumentType::PreviousSchoolReport,
    DocumentType::PassportPhotograph,
];

pub const MAX_DOCUMENT_SIZE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentRuleError {
    #[error("File size exceeds maximum limit of 10MB")]
    FileTooLarge { size: u64 },
    #[error("A file with this name already exists")]
    DuplicateFileName,
    #[error("{0} has already been uploaded for this application")]
    DuplicateDocumentType(DocumentType),
}

pub fn ensure_size_within_limit(size: u64) -> Result<(), DocumentRuleError> {
    if size > MAX_DOCUMENT_SIZE_BYTES {
        return Err(DocumentRuleError::FileTooLarge { size });
    }
    Ok(())
}

pub fn storage_path(
    application_id: ApplicationId,
    document_type: DocumentType,
    file_name: &str,
) -> String {
    format!("applications/{application_id}/{document_type}/{file_name}")
}

/// Upload and verification state of one document type on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistEntry {
    pub document_type: DocumentType,
    pub uploaded: bool,
    pub verified: bool,
}

/// Completeness view over the documents attached to a single application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentChecklist {
    present: BTreeMap<DocumentType, bool>,
}

impl DocumentChecklist {
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let present = documents
            .into_iter()
            .map(|doc| (doc.document_type, doc.is_verified))
            .collect();
        Self { present }
    }

    pub fn is_uploaded(&self, document_type: DocumentType) -> bool {
        self.present.contains_key(&document_type)
    }

    pub fn is_verified(&self, document_type: DocumentType) -> bool {
        self.present.get(&document_type).copied().unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        REQUIRED_DOCUMENT_TYPES
            .iter()
            .all(|required| self.is_uploaded(*required))
    }

    pub fn is_fully_verified(&self) -> bool {
        self.is_complete() && self.present.values().all(|verified| *verified)
    }

    pub fn missing(&self) -> Vec<DocumentType> {
        REQUIRED_DOCUMENT_TYPES
            .into_iter()
            .filter(|required| !self.is_uploaded(*required))
            .collect()
    }

    pub fn required_entries(&self) -> Vec<ChecklistEntry> {
        REQUIRED_DOCUMENT_TYPES
            .into_iter()
            .map(|document_type| ChecklistEntry {
                document_type,
                uploaded: self.is_uploaded(document_type),
                verified: self.is_verified(document_type),
            })
            .collect()
    }
}
