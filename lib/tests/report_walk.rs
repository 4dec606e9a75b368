//! End-to-end walk of a real report against a JSON symbol archive.

use crash_symbolicate::providers::{archive::JsonArchive, DebugArchive};
use crash_symbolicate::{CacheDirectory, CrashReport, Symbolicator};

const REPORT: &str = r#"{
    "faultingThread": 0,
    "termination": { "code": 11 },
    "usedImages": [
        {
            "uuid": "cb63147a-c9dc-308b-8ca1-ee92a5042e8e",
            "base": 4373479424,
            "name": "crashcrashcrash"
        }
    ],
    "threads": [
        {
            "frames": [
                { "imageOffset": 4199, "imageIndex": 0 },
                { "imageOffset": 4088, "imageIndex": 0 }
            ],
            "threadState": {
                "flavor": "ARM_THREAD_STATE64",
                "pc": { "value": 4199 },
                "lr": { "value": 4373483512 }
            }
        }
    ]
}"#;

const ARCHIVE: &str = r#"{
    "objects": [
        {
            "debug_id": "cb63147a-c9dc-308b-8ca1-ee92a5042e8e",
            "arch": "arm64",
            "ranges": [
                {
                    "start": 4072,
                    "end": 4084,
                    "locations": [
                        {
                            "symbol_address": 4072,
                            "instruction_address": 4072,
                            "line": 9,
                            "language": "swift",
                            "symbol": "$s15crashcrashcrash11crashTheAppyyF",
                            "full_path": "/tmp/main.swift"
                        }
                    ]
                },
                {
                    "start": 4084,
                    "end": 4200,
                    "locations": [
                        {
                            "symbol_address": 4294967295,
                            "instruction_address": 4196,
                            "line": 0,
                            "language": "swift",
                            "symbol": "Swift runtime failure: Unexpectedly found nil while unwrapping an Optional value",
                            "full_path": ""
                        },
                        {
                            "symbol_address": 4084,
                            "instruction_address": 4196,
                            "line": 12,
                            "language": "swift",
                            "symbol": "$s15crashcrashcrash4loopyyF",
                            "full_path": "/tmp/main.swift"
                        }
                    ]
                }
            ]
        }
    ]
}"#;

#[test]
fn walks_a_parsed_report_against_a_loaded_archive() {
    let report: CrashReport = serde_json::from_str(REPORT).unwrap();
    let archive = JsonArchive::from_slice(ARCHIVE.as_bytes()).unwrap();
    let directory = CacheDirectory::from_archives([&archive as &dyn DebugArchive]).unwrap();
    assert_eq!(directory.len(), 1);

    let walked = Symbolicator::new(&report, &directory).symbolicate_report();

    let frames = &walked.threads[0].frames;
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames[0].symbol.as_deref(),
        Some("Swift runtime failure: Unexpectedly found nil while unwrapping an Optional value")
    );
    assert_eq!(frames[0].symbol_location, Some(4294967295));
    assert_eq!(frames[0].image_offset, 4199);
    assert_eq!(
        frames[1].symbol.as_deref(),
        Some("$s15crashcrashcrash4loopyyF")
    );
    assert_eq!(frames[1].image_offset, 4199);
    assert_eq!(
        frames[2].symbol.as_deref(),
        Some("$s15crashcrashcrash11crashTheAppyyF")
    );
    assert_eq!(frames[2].symbol_location, Some(4072));
    assert_eq!(frames[2].image_offset, 4088);

    let json = serde_json::to_value(&walked.threads[0]).unwrap();
    assert_eq!(json["frames"][0]["imageOffset"], 4199);
    assert_eq!(json["frames"][2]["symbolLocation"], 4072);
}
