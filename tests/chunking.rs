//! End-to-end chunking behavior across every adapter.

use pretty_assertions::assert_eq;

use structured_chunker::prelude::*;
use structured_chunker::quality::score_texts;

const GUIDE: &str = "# Install\n\nDownload the archive and unpack it somewhere on your path. \
Make sure the binary is executable.\n\n## Linux\n\nUse the package manager when one is available. \
Otherwise copy the binary to /usr/local/bin and check the version.\n\n```bash\ncurl -LO https://example.org/tool.tar.gz\n\ntar xzf tool.tar.gz\n```\n\n\
### Troubleshooting\n\nPermission errors usually mean the binary is not executable.\n\n\
## Windows\n\nRun the installer and follow the prompts.\n\n# Usage\n\nStart the tool with a config file. \
Every option can also be passed on the command line.";

const SCRIPT: &str = "import os\nimport sys\n\n\
class Loader:\n    def __init__(self, root):\n        self.root = root\n\n    def load(self, name):\n        return open(os.path.join(self.root, name)).read()\n\n\
def main():\n    loader = Loader(sys.argv[1])\n    print(loader.load(sys.argv[2]))\n\n\
def helper(value):\n    return value * 2\n";

const PROSE: &str = "Chunking splits long documents into retrievable pieces. Each piece should read on its own.\n\n\
Good boundaries follow the structure of the text: sections, paragraphs and sentences. \
Bad boundaries cut words in half; they make retrieval noisy.\n\n\
When nothing else fits, the splitter falls back to fixed-width slices so that no piece exceeds the limit.";

fn squeeze(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn joined(chunks: &[Chunk]) -> String {
    chunks.iter().map(|c| squeeze(&c.text)).collect()
}

fn heading_level(heading: &str) -> usize {
    heading.chars().take_while(|&c| c == '#').count()
}

fn sentence_page(count: usize) -> String {
    (0..count).map(|i| format!("Sentence number {i:02}. ")).collect()
}

#[test]
fn test_coverage_generic() {
    for size in [40, 80, 200] {
        let chunker = GenericChunker::new(ChunkerConfig::with_size(size)).unwrap();
        let chunks = chunker.chunk(&SourceDocument::text(PROSE));
        assert_eq!(joined(&chunks), squeeze(PROSE), "target_size {size}");
    }
}

#[test]
fn test_coverage_markdown() {
    for size in [60, 150, 1000] {
        let config = ChunkerConfig::with_size(size).with_parent_headers(false);
        let chunks = MarkdownChunker::new(config).unwrap().chunk(&SourceDocument::markdown(GUIDE));
        assert_eq!(joined(&chunks), squeeze(GUIDE), "target_size {size}");
    }
}

#[test]
fn test_coverage_code() {
    for size in [50, 120, 1000] {
        let config = ChunkerConfig::with_size(size).with_language("python").with_imports(false);
        let chunks = CodeChunker::new(config).unwrap().chunk(&SourceDocument::code(SCRIPT, "python"));
        assert_eq!(joined(&chunks), squeeze(SCRIPT), "target_size {size}");
    }
}

#[test]
fn test_coverage_pdf() {
    let pages = vec![PdfPage::new(1, PROSE), PdfPage::new(2, sentence_page(12))];
    let expected = squeeze(&format!("{PROSE}{}", sentence_page(12)));

    for size in [60, 150, 1000] {
        let chunks = PdfChunker::new(ChunkerConfig::with_size(size))
            .unwrap()
            .chunk(&SourceDocument::pdf(pages.clone(), None));
        assert_eq!(joined(&chunks), expected, "target_size {size}");
    }
}

#[test]
fn test_size_bound() {
    let router = ChunkingRouter::default();
    let documents = [
        SourceDocument::text(PROSE),
        SourceDocument::markdown(GUIDE),
        SourceDocument::code(SCRIPT, "python"),
        SourceDocument::pdf(vec![PdfPage::new(1, PROSE)], None),
    ];

    for doc in &documents {
        for size in [60, 100, 250] {
            let config = ChunkerConfig::with_size(size).with_overlap(size / 5);
            let outcome = router.chunk(doc, None, Some(config)).unwrap();
            for chunk in &outcome.chunks {
                assert!(
                    chunk.size <= size,
                    "{} chunk of {} chars above {size}",
                    outcome.strategy,
                    chunk.size
                );
            }
        }
    }
}

#[test]
fn test_determinism() {
    let router = ChunkingRouter::with_config(ChunkerConfig::with_size(120).with_overlap(20));
    let documents = [
        SourceDocument::text(PROSE),
        SourceDocument::markdown(GUIDE),
        SourceDocument::code(SCRIPT, "python"),
    ];

    for doc in &documents {
        let first = router.chunk(doc, None, None).unwrap();
        let second = router.chunk(doc, None, None).unwrap();
        assert_eq!(first.chunks, second.chunks);
    }
}

#[test]
fn test_markdown_header_context() {
    let chunks = MarkdownChunker::new(ChunkerConfig::with_size(200))
        .unwrap()
        .chunk(&SourceDocument::markdown(GUIDE));

    let troubleshooting = chunks
        .iter()
        .find(|c| c.metadata.section.as_deref() == Some("### Troubleshooting"))
        .unwrap();
    assert_eq!(troubleshooting.metadata.headers, vec!["# Install", "## Linux"]);

    for chunk in &chunks {
        let headers = &chunk.metadata.headers;
        for pair in headers.windows(2) {
            assert!(heading_level(&pair[0]) < heading_level(&pair[1]));
        }

        let own = chunk.metadata.section.as_deref().unwrap_or_default();
        let own_at = GUIDE.find(own).unwrap();
        for header in headers {
            assert!(GUIDE.find(header.as_str()).unwrap() < own_at);
        }
    }
}

#[test]
fn test_scenario_markdown_sections() {
    let router = ChunkingRouter::default();
    let config = ChunkerConfig::with_size(100).with_parent_headers(true);
    let outcome = router
        .chunk(&SourceDocument::markdown("# A\n\ntext1\n\n## B\n\ntext2"), None, Some(config))
        .unwrap();

    assert_eq!(outcome.strategy, Strategy::Markdown);
    assert_eq!(outcome.chunks.len(), 2);
    assert!(outcome.chunks[1].metadata.headers.contains(&"# A".to_string()));
}

#[test]
fn test_scenario_small_code_file() {
    let source = "import os\n\ndef a():\n    pass\n\ndef b():\n    pass\n";
    let outcome = ChunkingRouter::default()
        .chunk(&SourceDocument::code(source, "python"), None, Some(ChunkerConfig::with_size(1000)))
        .unwrap();

    assert_eq!(outcome.chunks.len(), 1);
    let text = &outcome.chunks[0].text;
    assert!(text.starts_with("import os"));
    assert!(text.contains("def a()"));
    assert!(text.contains("def b()"));
}

#[test]
fn test_scenario_custom_separators() {
    let config = ChunkerConfig::with_size(6).with_separators([" ", ""]);
    let outcome = ChunkingRouter::default()
        .chunk(&SourceDocument::text("word1 word2 word3"), Some(Strategy::Generic), Some(config))
        .unwrap();

    let texts: Vec<&str> = outcome.chunks.iter().map(|c| c.text.as_str()).collect();
    assert!(texts.iter().all(|t| t.chars().count() <= 6));
    assert_eq!(texts.join(" "), "word1 word2 word3");
}

#[test]
fn test_scenario_pdf_pages() {
    let pages: Vec<PdfPage> = (1..=3).map(|n| PdfPage::new(n, sentence_page(10))).collect();
    assert!(pages.iter().all(|p| p.text.chars().count() == 200));

    let outcome = ChunkingRouter::default()
        .chunk(&SourceDocument::pdf(pages, None), None, Some(ChunkerConfig::with_size(150)))
        .unwrap();

    assert_eq!(outcome.strategy, Strategy::Pdf);
    assert_eq!(outcome.chunks.len(), 6);
    for page in 1..=3 {
        let on_page = outcome
            .chunks
            .iter()
            .filter(|c| c.metadata.page == Some(page))
            .count();
        assert_eq!(on_page, 2);
    }
}

#[test]
fn test_scenario_perfect_quality() {
    let texts = ["First part.\n\nSecond part.", "Another one.\n\nAnd its end."];
    assert_eq!(score_texts(texts), 1.0);
}

#[test]
fn test_empty_input_yields_no_chunks() {
    let router = ChunkingRouter::default();
    for doc in [SourceDocument::text(""), SourceDocument::markdown(""), SourceDocument::code("", "rust")] {
        let outcome = router.chunk(&doc, None, None).unwrap();
        assert!(outcome.chunks.is_empty());
        assert!(outcome.validation.is_valid);
    }
}

#[test]
fn test_invalid_configuration_rejected() {
    let router = ChunkingRouter::default();
    let doc = SourceDocument::text("content");

    let zero = ChunkerConfig::with_size(0);
    assert!(matches!(router.chunk(&doc, None, Some(zero)), Err(ChunkerError::InvalidConfig { .. })));

    let overlap = ChunkerConfig::with_size(100).with_overlap(100);
    assert!(matches!(router.chunk(&doc, None, Some(overlap)), Err(ChunkerError::InvalidConfig { .. })));

    let lenient = ChunkerConfig::with_size(100).with_overlap(100).lenient();
    assert!(router.chunk(&doc, None, Some(lenient)).is_ok());
}

#[tokio::test]
async fn test_benchmark_over_router_strategies() {
    let harness = BenchmarkHarness::default().with_concurrency(2);
    let cases = BenchmarkCase::grid(&[Strategy::Markdown, Strategy::Generic], &[100, 300]);
    let report = harness
        .run_parallel(std::sync::Arc::new(SourceDocument::markdown(GUIDE)), cases)
        .await;

    assert_eq!(report.results.len(), 4);
    assert!(report.results.iter().all(|r| r.is_ok()));
    assert!(report.recommendation.is_some());
}
