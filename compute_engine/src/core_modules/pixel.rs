// THEORY (Single-Pixel Intensity):
// The `Pixel` module is the smallest unit the grayscale engine works with. It is a
// "dumb" data container for one pixel's channels plus the single-pixel intensity
// measures that grayscale conversion needs. Nothing here looks at neighbours;
// the buffer-level walk lives in `grayscale`.
//
// What lives here:
// - Raw channels: red, green, blue and an optional alpha (3- or 4-channel data).
// - Two intensity measures, both returned on the 0..255 byte scale:
//   • average:   unweighted (R + G + B) / 3
//   • luminance: Rec. 601 luma, 0.299 R + 0.587 G + 0.114 B
// - Conversion back to interleaved bytes, with the alpha passed through.
//
// Rounding:
// Both measures truncate toward zero, computed in integer arithmetic so the same
// input always yields the same byte, whichever measure is selected.

pub mod pixel {
    use crate::core_modules::errors::ComputeError;

    pub type Byte = u8;
    pub type Bytes = Vec<Byte>;
    pub type Channel = Byte;
    pub type Luminance = f64;

    pub const RGB_CHANNELS: usize = 3;
    pub const RGBA_CHANNELS: usize = 4;

    /// A single RGB or RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel, if the source had one.
        pub alpha: Option<Channel>,
    }

    impl Pixel {
        pub fn rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue, alpha: None }
        }

        pub fn rgba(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel { red, green, blue, alpha: Some(alpha) }
        }

        /// Raw RGB channel sum (0..=765).
        pub fn sum(&self) -> u16 {
            self.red as u16 + self.green as u16 + self.blue as u16
        }

        /// Unweighted channel mean, truncated.
        pub fn average(&self) -> Channel {
            (self.sum() / 3) as Channel
        }

        /// Luminance estimate (Rec. 601 luma).
        ///
        /// - Interprets perceived brightness as a weighted sum of RGB.
        /// - Computed in f64 on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64 + 0.587_f64 * self.green as f64 + 0.114_f64 * self.blue as f64
        }

        /// Luminance truncated to a channel value.
        ///
        /// Uses the Rec. 601 weights in thousandths so the truncation is exact;
        /// `luminance() as u8` drifts one step low on some pure grays.
        pub fn luma(&self) -> Channel {
            let weighted = 299 * self.red as u32 + 587 * self.green as u32 + 114 * self.blue as u32;
            (weighted / 1000) as Channel
        }

        /// Replaces the three colour channels with `intensity`, keeping alpha.
        pub fn with_intensity(&self, intensity: Channel) -> Self {
            Pixel {
                red: intensity,
                green: intensity,
                blue: intensity,
                alpha: self.alpha,
            }
        }

        pub fn channel_count(&self) -> usize {
            if self.alpha.is_some() { RGBA_CHANNELS } else { RGB_CHANNELS }
        }

        /// Appends this pixel's interleaved channels to `out`.
        pub fn write_to(&self, out: &mut Bytes) {
            out.extend_from_slice(&[self.red, self.green, self.blue]);
            if let Some(alpha) = self.alpha {
                out.push(alpha);
            }
        }
    }

    impl TryFrom<&[Byte]> for Pixel {
        type Error = ComputeError;

        fn try_from(bytes: &[Byte]) -> Result<Self, Self::Error> {
            match *bytes {
                [red, green, blue] => Ok(Pixel::rgb(red, green, blue)),
                [red, green, blue, alpha] => Ok(Pixel::rgba(red, green, blue, alpha)),
                _ => Err(ComputeError::UnsupportedFormat(format!(
                    "cannot convert {} bytes into a pixel",
                    bytes.len()
                ))),
            }
        }
    }

    impl From<Pixel> for Bytes {
        fn from(pixel: Pixel) -> Self {
            let mut bytes = Vec::with_capacity(pixel.channel_count());
            pixel.write_to(&mut bytes);
            bytes
        }
    }
}
