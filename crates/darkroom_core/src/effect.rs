#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Submit a download task for the photo's source URL.
    StartDownload { id: crate::PhotoId, url: String },
    /// Submit a filter task over the downloaded bytes.
    StartFilter {
        id: crate::PhotoId,
        image: crate::ImageData,
    },
    /// Flag the photo's in-flight task so it abandons its work.
    CancelStage {
        id: crate::PhotoId,
        stage: crate::Stage,
    },
    /// Park both stage queues while scroll motion is under way.
    SuspendQueues,
    /// Release the stage queues after motion settles.
    ResumeQueues,
}
