use super::morphology::{cluster_positions, column_projection, open_horizontal, open_vertical};
use super::*;
use image::{GrayImage, Luma};

const WIDTH: u32 = 547;
const HEIGHT: u32 = 700;

fn blank_sheet() -> GrayImage {
    GrayImage::from_pixel(WIDTH, HEIGHT, Luma([255]))
}

fn draw_vertical(img: &mut GrayImage, x: u32, thickness: u32) {
    for dx in 0..thickness {
        for y in 0..img.height() {
            img.put_pixel(x + dx, y, Luma([0]));
        }
    }
}

fn draw_horizontal(img: &mut GrayImage, y: u32, thickness: u32) {
    for dy in 0..thickness {
        for x in 0..img.width() {
            img.put_pixel(x, y + dy, Luma([0]));
        }
    }
}

fn ruled_sheet(divider_x: u32, first_row: u32, pitch: u32, rows: u32) -> GrayImage {
    let mut img = blank_sheet();
    draw_vertical(&mut img, divider_x, 2);
    for i in 0..rows {
        draw_horizontal(&mut img, first_row + i * pitch, 2);
    }
    img
}

mod detection_tests {
    use super::*;

    #[test]
    fn test_detects_divider_and_rows() {
        let img = ruled_sheet(60, 40, 25, 20);
        let geometry = detect_from_image(&img, &GeometryConfig::default()).unwrap();

        assert!(geometry.divider_detected);
        assert!(geometry.rows_detected);
        assert_eq!(geometry.divider_x, 60);
        assert_eq!(geometry.row_ys.len(), 20);
        assert_eq!(geometry.row_ys[0], 40);
        assert_eq!(geometry.row_ys[19], 40 + 19 * 25);
        assert_eq!(geometry.page_width, WIDTH);
        assert_eq!(geometry.page_height, HEIGHT);
        assert!((geometry.average_row_height() - 25.0).abs() < 0.01);
    }

    #[test]
    fn test_divider_in_edge_margin_is_ignored() {
        let mut img = ruled_sheet(200, 40, 25, 10);
        // Page border inside the 5% margin.
        draw_vertical(&mut img, 5, 2);
        let geometry = detect_from_image(&img, &GeometryConfig::default()).unwrap();
        assert_eq!(geometry.divider_x, 200);
    }

    #[test]
    fn test_short_vertical_strokes_are_not_dividers() {
        let mut img = blank_sheet();
        // Handwriting-like stroke far shorter than height / 8.
        for y in 100..130 {
            img.put_pixel(100, y, Luma([0]));
        }
        for i in 0..10 {
            draw_horizontal(&mut img, 40 + i * 25, 1);
        }
        let geometry = detect_from_image(&img, &GeometryConfig::default()).unwrap();
        assert!(!geometry.divider_detected);
        assert_eq!(geometry.divider_x, (WIDTH as f32 * 0.108) as u32);
        assert!(geometry.rows_detected);
    }

    #[test]
    fn test_blank_page_falls_back_to_even_rows() {
        let geometry = detect_from_image(&blank_sheet(), &GeometryConfig::default()).unwrap();

        assert!(!geometry.divider_detected);
        assert!(!geometry.rows_detected);
        assert!(!geometry.is_structured());
        assert_eq!(geometry.row_ys[0], 0);
        assert_eq!(geometry.row_ys[1], 25);
        assert_eq!(geometry.row_ys.len(), HEIGHT.div_ceil(25) as usize);
    }

    #[test]
    fn test_two_lines_are_not_a_grid() {
        let mut img = blank_sheet();
        draw_horizontal(&mut img, 100, 1);
        draw_horizontal(&mut img, 200, 1);
        let geometry = detect_from_image(&img, &GeometryConfig::default()).unwrap();
        assert!(!geometry.rows_detected);
    }

    #[test]
    fn test_empty_image_is_error() {
        let img = GrayImage::new(0, 0);
        let err = detect_from_image(&img, &GeometryConfig::default()).unwrap_err();
        assert!(matches!(err, GeometryError::EmptyImage { .. }));
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = detect_sheet_geometry(
            std::path::Path::new("/nonexistent/sheet.png"),
            &GeometryConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::ImageRead { .. }));
    }

    #[test]
    fn test_detect_from_png_bytes() {
        let img = ruled_sheet(80, 60, 30, 8);
        let mut bytes = Vec::new();
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let geometry = detect_from_bytes(&bytes, &GeometryConfig::default()).unwrap();
        assert_eq!(geometry.divider_x, 80);
        assert_eq!(geometry.row_ys.len(), 8);
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let err = detect_from_bytes(b"not an image", &GeometryConfig::default()).unwrap_err();
        assert!(matches!(err, GeometryError::ImageDecode { .. }));
    }
}

mod layout_tests {
    use super::*;

    fn geometry() -> SheetGeometry {
        SheetGeometry {
            divider_x: 60,
            row_ys: vec![100, 125, 150, 175],
            page_width: 547,
            page_height: 700,
            divider_detected: true,
            rows_detected: true,
        }
    }

    #[test]
    fn test_row_index_inside_bands() {
        let g = geometry();
        assert_eq!(g.row_index_for_y(100.0), 0);
        assert_eq!(g.row_index_for_y(124.9), 0);
        assert_eq!(g.row_index_for_y(125.0), 1);
        assert_eq!(g.row_index_for_y(160.0), 2);
    }

    #[test]
    fn test_row_index_outside_defaults_to_last() {
        let g = geometry();
        assert_eq!(g.row_index_for_y(20.0), 3);
        assert_eq!(g.row_index_for_y(500.0), 3);
    }

    #[test]
    fn test_row_index_with_no_rows() {
        let g = SheetGeometry {
            row_ys: vec![],
            ..geometry()
        };
        assert_eq!(g.row_index_for_y(10.0), 0);
    }

    #[test]
    fn test_label_column() {
        let g = geometry();
        assert!(g.is_label_column(59.9));
        assert!(!g.is_label_column(60.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            geometry().to_string(),
            "SheetGeometry(divider_x=60, rows=4, page=547x700)"
        );
    }
}

mod primitive_tests {
    use super::*;

    #[test]
    fn test_otsu_bimodal() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([200]));
        for x in 0..10 {
            img.put_pixel(x, 0, Luma([30]));
        }
        let level = otsu_level(&img);
        assert!((30..200).contains(&level));

        let mask = binarize_inverted(&img);
        assert_eq!(mask.ink_count(), 10);
        assert!(mask.get(3, 0));
        assert!(!mask.get(3, 5));
    }

    #[test]
    fn test_open_vertical_keeps_long_runs_only() {
        let mut mask = InkMask::new(3, 10);
        for y in 0..8 {
            mask.set(0, y, true);
        }
        for y in 0..3 {
            mask.set(2, y, true);
        }
        let opened = open_vertical(&mask, 5);
        assert_eq!(column_projection(&opened), vec![8, 0, 0]);
    }

    #[test]
    fn test_open_horizontal_keeps_long_runs_only() {
        let mut mask = InkMask::new(10, 2);
        for x in 0..10 {
            mask.set(x, 0, true);
        }
        mask.set(4, 1, true);
        let opened = open_horizontal(&mask, 6);
        assert_eq!(opened.ink_count(), 10);
        assert!(!opened.get(4, 1));
    }

    #[test]
    fn test_cluster_positions() {
        assert_eq!(
            cluster_positions(&[10, 11, 12, 30, 31, 60], 5),
            vec![11, 30, 60]
        );
        assert!(cluster_positions(&[], 5).is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(GeometryConfig::default().validate().is_ok());

        let bad = GeometryConfig {
            divider_ratio_fallback: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = GeometryConfig {
            fallback_row_pitch: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_kernel_len_has_floor() {
        let config = GeometryConfig::default();
        assert_eq!(config.kernel_len(800), 100);
        assert_eq!(config.kernel_len(80), 20);
    }
}
