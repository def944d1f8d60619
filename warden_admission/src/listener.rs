use crate::AdmissionEvent;

use async_trait::async_trait;

/// Something that takes part in deciding whether a connection is admitted.
///
/// For each attempt the host runs `early` on every listener, then `late` on
/// every listener, each phase in registration order. Both receive the same
/// event, and any listener may change its decision at any point.
#[async_trait]
pub trait AdmissionListener: Send + Sync {
    /// Name used to attribute writes to the shared decision
    fn name(&self) -> &str;

    async fn early(&self, event: &mut AdmissionEvent);

    async fn late(&self, event: &mut AdmissionEvent);
}
