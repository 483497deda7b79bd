//! GPS geotagging from photo EXIF metadata.
//!
//! Cameras store latitude and longitude as three unsigned rationals
//! (degrees, minutes, seconds) plus a hemisphere reference (`N`/`S`,
//! `E`/`W`). Inspections store the converted decimal degrees as strings.

/// Number of decimal places kept when a coordinate is persisted (~0.1 m).
pub const COORDINATE_DECIMALS: usize = 6;

/// A point in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Latitude formatted for storage, e.g. `"-23.550139"`.
    pub fn latitude_string(&self) -> String {
        format_coordinate(self.latitude)
    }

    /// Longitude formatted for storage, e.g. `"-46.633333"`.
    pub fn longitude_string(&self) -> String {
        format_coordinate(self.longitude)
    }

    #[cfg(feature = "exif")]
    fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

/// Format a decimal-degree value with [`COORDINATE_DECIMALS`] places.
pub fn format_coordinate(value: f64) -> String {
    format!("{value:.prec$}", prec = COORDINATE_DECIMALS)
}

/// Convert degrees/minutes/seconds to signed decimal degrees.
///
/// The southern and western hemispheres (`S`, `W`, case-insensitive) are
/// negative; any other reference is treated as positive.
///
/// ```
/// use campo_core::geo::dms_to_decimal;
///
/// assert_eq!(dms_to_decimal(10.0, 30.0, 0.0, 'N'), 10.5);
/// assert_eq!(dms_to_decimal(10.0, 30.0, 0.0, 'W'), -10.5);
/// ```
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, reference: char) -> f64 {
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    match reference.to_ascii_uppercase() {
        'S' | 'W' => -value,
        _ => value,
    }
}

/// Return the coordinates of the first photo in `photos` that carries
/// usable GPS metadata.
pub fn first_coordinates<'a, I>(photos: I) -> Option<Coordinates>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    photos.into_iter().find_map(extract_coordinates)
}

/// Extract GPS coordinates from an image's EXIF block.
///
/// Returns `None` when the image has no EXIF data, no GPS tags, or values
/// that do not describe a point on the globe.
#[cfg(feature = "exif")]
pub fn extract_coordinates(bytes: &[u8]) -> Option<Coordinates> {
    use exif::{Reader, Tag};

    let mut cursor = std::io::Cursor::new(bytes);
    let metadata = match Reader::new().read_from_container(&mut cursor) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::debug!(error = %e, "No readable EXIF metadata");
            return None;
        }
    };

    let latitude = read_axis(&metadata, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
    let longitude = read_axis(&metadata, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;
    let coordinates = Coordinates {
        latitude,
        longitude,
    };

    if coordinates.is_valid() {
        Some(coordinates)
    } else {
        tracing::warn!(latitude, longitude, "Discarding out-of-range EXIF GPS values");
        None
    }
}

#[cfg(not(feature = "exif"))]
pub fn extract_coordinates(_bytes: &[u8]) -> Option<Coordinates> {
    tracing::warn!("EXIF support is not compiled in; skipping geotagging");
    None
}

/// Read one axis (latitude or longitude) as signed decimal degrees.
#[cfg(feature = "exif")]
fn read_axis(metadata: &exif::Exif, value_tag: exif::Tag, ref_tag: exif::Tag) -> Option<f64> {
    use exif::{In, Value};

    let field = metadata.get_field(value_tag, In::PRIMARY)?;
    let parts = match &field.value {
        Value::Rational(parts) if parts.len() >= 3 => parts,
        _ => return None,
    };

    // A zero denominator yields NaN/inf, which `is_valid` rejects later.
    let degrees = parts[0].to_f64();
    let minutes = parts[1].to_f64();
    let seconds = parts[2].to_f64();

    let reference = metadata
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Ascii(values) => values.first().and_then(|v| v.first()).copied(),
            _ => None,
        })
        .map(char::from)
        .unwrap_or('N');

    Some(dms_to_decimal(degrees, minutes, seconds, reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn northern_eastern_are_positive() {
        let value = dms_to_decimal(51.0, 28.0, 38.0, 'N');
        assert!((value - 51.477_222).abs() < 1e-6);
        assert!(dms_to_decimal(0.0, 7.0, 39.0, 'E') > 0.0);
    }

    #[test]
    fn southern_western_are_negative() {
        assert!((dms_to_decimal(23.0, 33.0, 0.0, 'S') + 23.55).abs() < 1e-9);
        assert!((dms_to_decimal(46.0, 38.0, 0.0, 'w') + 46.633_333).abs() < 1e-6);
    }

    #[test]
    fn unknown_reference_is_positive() {
        assert_eq!(dms_to_decimal(1.0, 0.0, 0.0, '?'), 1.0);
    }

    #[test]
    fn format_keeps_six_decimals() {
        assert_eq!(format_coordinate(-23.5501388888), "-23.550139");
        assert_eq!(format_coordinate(10.0), "10.000000");
    }

    #[cfg(feature = "exif")]
    #[test]
    fn out_of_range_coordinates_are_invalid() {
        let bad = Coordinates {
            latitude: 91.0,
            longitude: 0.0,
        };
        assert!(!bad.is_valid());
        let nan = Coordinates {
            latitude: f64::NAN,
            longitude: 0.0,
        };
        assert!(!nan.is_valid());
    }

    #[test]
    fn non_image_bytes_have_no_coordinates() {
        assert_eq!(extract_coordinates(b"definitely not a photo"), None);
        assert_eq!(first_coordinates(Vec::<&[u8]>::new()), None);
    }

    #[cfg(feature = "exif")]
    mod fixture {
        use super::super::*;
        use exif::experimental::Writer;
        use exif::{Field, In, Rational, Tag, Value};

        fn rational(num: u32, denom: u32) -> Rational {
            Rational { num, denom }
        }

        fn ascii(s: &str) -> Value {
            Value::Ascii(vec![s.as_bytes().to_vec()])
        }

        /// A TIFF-container EXIF block placing the camera in São Paulo:
        /// 23°33'0.5" S, 46°38'0" W.
        fn sao_paulo_exif() -> Vec<u8> {
            let fields = [
                Field {
                    tag: Tag::GPSLatitudeRef,
                    ifd_num: In::PRIMARY,
                    value: ascii("S"),
                },
                Field {
                    tag: Tag::GPSLatitude,
                    ifd_num: In::PRIMARY,
                    value: Value::Rational(vec![
                        rational(23, 1),
                        rational(33, 1),
                        rational(5, 10),
                    ]),
                },
                Field {
                    tag: Tag::GPSLongitudeRef,
                    ifd_num: In::PRIMARY,
                    value: ascii("W"),
                },
                Field {
                    tag: Tag::GPSLongitude,
                    ifd_num: In::PRIMARY,
                    value: Value::Rational(vec![
                        rational(46, 1),
                        rational(38, 1),
                        rational(0, 1),
                    ]),
                },
            ];

            let mut writer = Writer::new();
            for field in &fields {
                writer.push_field(field);
            }
            let mut buf = std::io::Cursor::new(Vec::new());
            writer.write(&mut buf, false).unwrap();
            buf.into_inner()
        }

        #[test]
        fn extracts_known_fixture() {
            let coords = extract_coordinates(&sao_paulo_exif()).expect("GPS fixture");
            assert_eq!(coords.latitude_string(), "-23.550139");
            assert_eq!(coords.longitude_string(), "-46.633333");
        }

        #[test]
        fn first_coordinates_skips_photos_without_gps() {
            let fixture = sao_paulo_exif();
            let photos = vec![b"no exif here".as_slice(), fixture.as_slice()];
            let coords = first_coordinates(photos).expect("second photo has GPS");
            assert!((coords.latitude + 23.550_138).abs() < 1e-5);
        }
    }
}
