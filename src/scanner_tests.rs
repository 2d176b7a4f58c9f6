#[cfg(test)]
mod tests {
    use crate::diagnostics::{DecodeEvent, EventRecorder, NullObserver};
    use crate::image::ByteImage;
    use crate::opcode_tables::Revision;
    use crate::recovery::ScanResult;
    use crate::scanner::{
        candidate_at, decode_line, decode_unit, scan_range, Candidate, LineDecode, ScanContext,
        UnitOutcome,
    };
    use test_log::test;

    /// One stored line: count, number (low byte first), space, body, 0x00.
    fn line(number: u16, body: &[u8]) -> Vec<u8> {
        let mut bytes = vec![(body.len() + 4) as u8];
        bytes.extend_from_slice(&number.to_le_bytes());
        bytes.push(0x20);
        bytes.extend_from_slice(body);
        bytes.push(0x00);
        bytes
    }

    /// Lines followed by an end-of-program marker, padded so the marker
    /// passes the bounds check.
    fn program(lines: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes: Vec<u8> = lines.concat();
        bytes.extend_from_slice(&[0x00; 4]);
        bytes
    }

    fn scan_all(bytes: Vec<u8>, revision: Revision) -> (ScanResult, EventRecorder) {
        let image = ByteImage::new(bytes);
        let mut recorder = EventRecorder::new();
        let end = image.len().saturating_sub(1);
        let result = scan_range(&image, 0, end, revision, &mut recorder);
        (result, recorder)
    }

    fn texts(result: &ScanResult) -> Vec<Vec<String>> {
        result
            .programs
            .iter()
            .map(|p| p.lines.iter().map(|l| l.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_print_line() {
        // count, line 10, space, PRINT, stored space, terminator
        let bytes = program(&[vec![0x07, 0x0A, 0x00, 0x20, 0x04, 0xA3, 0x20, 0x00]]);
        let (result, _) = scan_all(bytes, Revision::Full);
        assert_eq!(texts(&result), vec![vec!["10 PRINT ".to_string()]]);
        assert!(result.fragments.is_empty());
    }

    #[test]
    fn test_line_without_program_end_is_a_fragment() {
        let (result, events) = scan_all(line(10, &[0x04, 0xA3]), Revision::Full);
        assert!(result.programs.is_empty());
        assert_eq!(result.fragments.len(), 1);
        assert_eq!(result.fragments[0].lines[0].to_string(), "10 PRINT");
        assert_eq!(
            events.count_where(|e| matches!(e, DecodeEvent::FragmentDiscarded { .. })),
            1
        );
    }

    #[test]
    fn test_count_past_end_is_not_a_line() {
        let bytes = vec![0x40, 0x0A, 0x00, 0x20, 0x41, 0x00, 0x00, 0x00];
        let image = ByteImage::new(bytes.clone());
        assert_eq!(candidate_at(&image, 0), Candidate::OutOfBounds);

        let (result, _) = scan_all(bytes, Revision::Full);
        assert_eq!(result, ScanResult::default());
    }

    #[test]
    fn test_candidate_checks() {
        let image = ByteImage::new(line(300, b"A"));
        assert_eq!(
            candidate_at(&image, 0),
            Candidate::Line {
                count: 5,
                number: 300
            }
        );
        // missing header space
        let image = ByteImage::new(vec![0x05, 0x0A, 0x00, 0x21, 0x41, 0x00, 0x00]);
        assert_eq!(candidate_at(&image, 0), Candidate::Rejected);
        // zero count never forms a line
        let image = ByteImage::new(vec![0x00; 8]);
        assert_eq!(candidate_at(&image, 0), Candidate::Rejected);
    }

    #[test]
    fn test_short_count_is_a_line() {
        // count 2: the terminator is the high line number byte, so the
        // body is empty
        let image = ByteImage::new(vec![0x02, 0x0A, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(
            candidate_at(&image, 0),
            Candidate::Line {
                count: 2,
                number: 10
            }
        );
        match decode_line(&image, 0, 2, 10, Revision::Full, &mut NullObserver) {
            LineDecode::Complete { line, next } => {
                assert_eq!(line.text, "");
                assert_eq!(next, 4);
            }
            other => panic!("expected complete line, got {:?}", other),
        }
    }

    #[test]
    fn test_short_count_line_zero_discards_buffer() {
        // line 10, then a count 1 candidate numbered 0
        let bytes = vec![
            0x06, 0x0A, 0x00, 0x20, 0x41, 0x42, 0x00, 0x01, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00,
            0x00,
        ];
        let (result, events) = scan_all(bytes, Revision::Full);
        assert!(result.programs.is_empty());
        assert_eq!(result.fragments.len(), 1);
        assert_eq!(result.fragments[0].lines[0].to_string(), "10 AB");
        assert!(events.events.iter().any(|e| matches!(
            e,
            DecodeEvent::InvalidLineNumber {
                address: 7,
                line_number: 0,
                previous: 10,
            }
        )));
    }

    #[test]
    fn test_decreasing_line_number_discards_buffer() {
        let bytes = program(&[
            line(10, b"A=1"),
            line(20, b"B=2"),
            line(15, b"C=3"),
            vec![0x00],
            line(30, b"D=4"),
        ]);
        let (result, events) = scan_all(bytes, Revision::Full);

        assert_eq!(texts(&result), vec![vec!["30 D=4".to_string()]]);
        assert_eq!(result.fragments.len(), 1);
        assert_eq!(result.fragments[0].lines[0].to_string(), "10 A=1");
        assert_eq!(result.fragments[0].lines[1].to_string(), "20 B=2");
        assert!(events.events.iter().any(|e| matches!(
            e,
            DecodeEvent::InvalidLineNumber {
                line_number: 15,
                previous: 20,
                ..
            }
        )));
    }

    #[test]
    fn test_duplicate_line_number_rejected() {
        let bytes = program(&[line(10, b"A"), line(10, b"B")]);
        let (result, _) = scan_all(bytes, Revision::Full);
        for p in &result.programs {
            let numbers = p.line_numbers();
            assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(result.fragments[0].lines[0].text, "A");
    }

    #[test]
    fn test_separator_before_else_is_hidden() {
        // IF A THEN 10 :ELSE 20
        let body = [
            0x04, 0x8D, b'A', 0x07, 0x47, 0x03, 0x0A, 0x00, 0x20, 0x01, 0x07, 0x48, 0x20, 0x03,
            0x14, 0x00,
        ];
        let (result, events) = scan_all(program(&[line(100, &body)]), Revision::Full);
        assert_eq!(
            texts(&result),
            vec![vec!["100 IF A THEN 10 ELSE 20".to_string()]]
        );
        assert_eq!(
            events.count_where(|e| matches!(e, DecodeEvent::SeparatorBeforeElse { .. })),
            1
        );
    }

    #[test]
    fn test_separator_lookahead_skips_spaces() {
        let body = [b'A', 0x01, 0x20, 0x20, 0x07, 0x48, b'B'];
        let (result, _) = scan_all(program(&[line(5, &body)]), Revision::Full);
        assert_eq!(result.programs[0].lines[0].text, "A  ELSE B");
    }

    #[test]
    fn test_separator_kept_elsewhere() {
        let body = [b'A', 0x01, 0x04, 0x87];
        let (result, _) = scan_all(program(&[line(5, &body)]), Revision::Full);
        assert_eq!(result.programs[0].lines[0].text, "A:END");
    }

    #[test]
    fn test_all_zero_image() {
        let (result, events) = scan_all(vec![0x00; 65536], Revision::Full);
        assert!(result.programs.is_empty());
        assert!(result.fragments.iter().all(|f| f.is_empty()));
        assert!(events.events.is_empty());
    }

    #[test]
    fn test_unknown_opcode_placeholder() {
        let (result, events) = scan_all(program(&[line(10, &[0x07, 0xC9])]), Revision::Full);
        assert_eq!(result.programs[0].lines[0].text, "{C9 7}");
        assert!(events.events.iter().any(|e| matches!(
            e,
            DecodeEvent::UnknownOpcode {
                group: 0x07,
                command: 0xC9,
                ..
            }
        )));
    }

    #[test]
    fn test_unknown_byte_placeholder() {
        let (result, events) = scan_all(program(&[line(10, &[b'A', 0xFE])]), Revision::Full);
        assert_eq!(result.programs[0].lines[0].text, "A{FE}");
        assert_eq!(
            events.count_where(|e| matches!(e, DecodeEvent::UnknownCharacter { byte: 0xFE, .. })),
            1
        );
    }

    #[test]
    fn test_interior_terminator_invalidates_line() {
        let bytes = program(&[
            line(10, b"A"),
            line(20, &[b'B', 0x00, b'C']),
            vec![0x00],
            line(40, b"D"),
        ]);
        let (result, events) = scan_all(bytes, Revision::Full);
        assert_eq!(texts(&result), vec![vec!["40 D".to_string()]]);
        let fragment = &result.fragments[0];
        assert_eq!(fragment.lines.len(), 1);
        assert_eq!(fragment.partial.as_ref().unwrap().to_string(), "20 B");
        assert_eq!(
            events.count_where(|e| matches!(e, DecodeEvent::InteriorTerminator { .. })),
            1
        );
    }

    #[test]
    fn test_keyword_eating_terminator_invalidates_line() {
        // the PRINT marker is the last body byte, its command byte would be
        // the terminator
        let bytes = program(&[line(10, &[b'A', 0x04])]);
        let (result, events) = scan_all(bytes, Revision::Full);
        assert!(result.programs.is_empty());
        assert_eq!(result.fragments.len(), 1);
        assert_eq!(
            events.count_where(|e| matches!(e, DecodeEvent::TruncatedToken { .. })),
            1
        );
    }

    #[test]
    fn test_line_reference_renders_decimal() {
        let body = [0x04, 0x49, 0x03, 0x2C, 0x01];
        let (result, _) = scan_all(program(&[line(10, &body)]), Revision::Full);
        assert_eq!(result.programs[0].lines[0].text, "GOTO 300");
    }

    #[test]
    fn test_remark_marker_is_single_byte() {
        // the command byte selects the apostrophe and is then read again
        // as a character
        let body = [b'A', 0x02, 0x45, b'h', b'i'];
        let (result, events) = scan_all(program(&[line(10, &body)]), Revision::Full);
        assert_eq!(result.programs[0].lines[0].text, "A 'Ehi");
        assert_eq!(
            events.count_where(|e| matches!(e, DecodeEvent::UnknownOpcode { .. })),
            0
        );
    }

    #[test]
    fn test_unknown_remark_command() {
        let body = [b'A', 0x02, 0x68];
        let (result, events) = scan_all(program(&[line(10, &body)]), Revision::Full);
        assert_eq!(result.programs[0].lines[0].text, "A {68 2}h");
        assert_eq!(
            events.count_where(|e| matches!(
                e,
                DecodeEvent::UnknownOpcode {
                    group: 0x02,
                    command: 0x68,
                    ..
                }
            )),
            1
        );
    }

    #[test]
    fn test_spacing_between_keywords_and_names() {
        // PRINTA;CHR$(65)
        let body = [0x04, 0xA3, b'A', b';', 0x06, 0xA0, b'(', b'6', b'5', b')'];
        let (result, _) = scan_all(program(&[line(10, &body)]), Revision::Full);
        assert_eq!(result.programs[0].lines[0].text, "PRINT A;CHR$(65)");
    }

    #[test]
    fn test_early_revision_has_no_spacing() {
        let body = [0x04, 0xA3, b'A', 0x06, 0xA8, 0x05, 0x6B];
        let bytes = program(&[line(10, &body)]);
        let (early, _) = scan_all(bytes.clone(), Revision::Early);
        assert_eq!(early.programs[0].lines[0].text, "PRINTAINKEY{6B 5}");
        let (full, _) = scan_all(bytes, Revision::Full);
        assert_eq!(full.programs[0].lines[0].text, "PRINT A INKEY$ SIN ");
    }

    #[test]
    fn test_two_programs() {
        let mut bytes = program(&[line(10, b"A"), line(20, b"B")]);
        bytes.extend(program(&[line(5, b"C")]));
        let (result, events) = scan_all(bytes, Revision::Full);
        assert_eq!(
            texts(&result),
            vec![
                vec!["10 A".to_string(), "20 B".to_string()],
                vec!["5 C".to_string()]
            ]
        );
        assert_eq!(
            events.count_where(|e| matches!(e, DecodeEvent::ProgramCompleted { .. })),
            2
        );
    }

    #[test]
    fn test_garbage_between_programs() {
        let mut bytes = vec![0xFF, 0x13, 0x37, 0x99, 0x42];
        bytes.extend(program(&[line(10, b"X=1")]));
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        let (result, _) = scan_all(bytes, Revision::Full);
        assert_eq!(texts(&result), vec![vec!["10 X=1".to_string()]]);
    }

    #[test]
    fn test_unit_consumption_matches_count() {
        let body = [0x04, 0x8D, b'A', 0x07, 0x47, 0x03, 0x0A, 0x00, 0x01, 0x02, b'x', 0x7F];
        let bytes = line(10, &body);
        let image = ByteImage::new(bytes.clone());
        let count = bytes[0] as usize;

        let mut ctx = ScanContext::for_line(0, count, 10);
        let mut consumed = 0;
        loop {
            let unit = decode_unit(&image, &ctx, Revision::Full);
            match unit.outcome {
                UnitOutcome::Continue => {
                    assert!(unit.consumed >= 1 && unit.consumed <= 3);
                    consumed += unit.consumed;
                    ctx = ctx.advance(&image, &unit);
                }
                UnitOutcome::EndOfLine => {
                    consumed += unit.consumed;
                    break;
                }
                other => panic!("unexpected outcome {:?}", other),
            }
        }
        assert_eq!(consumed, count - 3);
    }

    #[test]
    fn test_decode_line_resume_points() {
        let bytes = line(10, &[b'A', 0x00, b'B']);
        let image = ByteImage::new(bytes);
        match decode_line(&image, 0, 7, 10, Revision::Full, &mut NullObserver) {
            LineDecode::Broken { partial, next } => {
                assert_eq!(partial.text, "A");
                assert_eq!(next, 5);
            }
            other => panic!("expected broken line, got {:?}", other),
        }

        let image = ByteImage::new(line(10, b"AB"));
        match decode_line(&image, 0, 6, 10, Revision::Full, &mut NullObserver) {
            LineDecode::Complete { line, next } => {
                assert_eq!(line.text, "AB");
                assert_eq!(next, 7);
            }
            other => panic!("expected complete line, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_is_deterministic() {
        let mut bytes = program(&[line(10, &[0x04, 0xA3, b'"', b'H', b'"'])]);
        bytes.extend_from_slice(&[0x13, 0x00, 0x20, 0x07, 0xFE, 0x01]);
        bytes.extend(program(&[line(7, b"Z"), line(3, b"Y")]));
        let (a, _) = scan_all(bytes.clone(), Revision::Full);
        let (b, _) = scan_all(bytes, Revision::Full);
        assert_eq!(a, b);
    }

    #[test]
    fn test_lookahead_past_range_end() {
        // the range ends on the count byte; the rest of the line lies beyond
        let bytes = program(&[line(10, b"A")]);
        let image = ByteImage::new(bytes);
        let result = scan_range(&image, 0, 0, Revision::Full, &mut NullObserver);
        assert!(result.programs.is_empty());
        assert_eq!(result.fragments[0].lines[0].to_string(), "10 A");
    }
}
