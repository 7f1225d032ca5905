mod data;
mod document;
mod mapping;

pub use data::{
    AssemblyError, CertificateData, CertificateTest, CompanyIdentity, FinalizedCertificate,
    PatientBlock, PractitionerIdentity, ReferralActions, SignatureBlock, TestResultLine, NOT_DONE,
};
pub use document::{
    CertificateDocument, Checkbox, DocumentBlock, DocumentRenderer, JsonRenderer,
    PlainTextRenderer, RenderError, RenderedDocument, CERTIFICATE_TITLE,
};
pub use mapping::{
    classify_hearing, classify_lung_function, map_to_certificate_data, split_name,
    CertificateDeclaration, CertificateSource,
};

/// A finalized certificate together with its rendered document.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub certificate: FinalizedCertificate,
    pub document: RenderedDocument,
}

#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Maps station records onto the certificate schema and issues the document.
pub struct CertificateAssembler<D> {
    company: CompanyIdentity,
    renderer: D,
}

impl<D> CertificateAssembler<D>
where
    D: DocumentRenderer,
{
    pub fn new(company: CompanyIdentity, renderer: D) -> Self {
        Self { company, renderer }
    }

    pub fn map(
        &self,
        practitioner: &PractitionerIdentity,
        source: CertificateSource<'_>,
        declaration: CertificateDeclaration,
    ) -> CertificateData {
        map_to_certificate_data(&self.company, practitioner, source, declaration)
    }

    /// Finalizes `data` and renders it. Nothing is returned unless both succeed.
    pub fn issue(&self, data: CertificateData) -> Result<IssuedCertificate, CertificateError> {
        let certificate = data.finalize()?;
        let layout = CertificateDocument::from_certificate(&certificate);
        let document = self.renderer.render(&layout)?;
        Ok(IssuedCertificate {
            certificate,
            document,
        })
    }
}
