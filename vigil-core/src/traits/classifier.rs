//! Camera image classifier trait

/// Errors reported by an image classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClassifierError {
    /// Image could not be decoded
    UnreadableImage,
    /// Classification backend did not respond
    Unavailable,
}

/// Trait for camera frame classifiers
///
/// Implementations wrap whatever model or service recognises cats. The
/// controller only consumes the verdict.
pub trait ImageClassifier {
    /// Frame type accepted by this classifier
    type Image: ?Sized;

    /// Check whether the image shows a cat
    ///
    /// `confidence_threshold` is a percentage (0.0–100.0); a detection below
    /// it counts as "no cat".
    fn image_contains_cat(
        &mut self,
        image: &Self::Image,
        confidence_threshold: f32,
    ) -> Result<bool, ClassifierError>;
}
