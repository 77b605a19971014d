//! System prompts and template builders for the pipeline steps.
//!
//! Prompts are the core instructions for each step. Template builders
//! fill the `{placeholder}` slots with the research topic, the current
//! date, and the requested query count.

use std::path::Path;

/// Prompt for the classification step.
pub const CLASSIFICATION_PROMPT: &str = r#"Bạn là một trợ lý AI pháp lý chuyên gia của Việt Nam. Nhiệm vụ của bạn là phân loại các truy vấn của người dùng.
Xác định xem câu hỏi của người dùng có liên quan đến một trong các chủ đề sau trong luật pháp Việt Nam hay không:
- Mua, bán, chuyển nhượng hoặc tặng cho đất đai/tài sản.
- Mua, bán hoặc đăng ký xe (ô tô, xe máy).
- Công chứng hoặc xác thực các tài liệu và hợp đồng.
- Bất kỳ vấn đề hoặc câu hỏi nào liên quan đến Luật/Pháp lý.
- Thời gian các loại giấy tờ pháp lý.
- Các thủ tục mua bán luật pháp.
- Các câu hỏi về văn phòng/tổ chức công chứng, chứng thực.
- Sát nhập tỉnh/thành phố 2025.

Trả lời 'true' nếu câu hỏi thuộc một trong các danh mục này. Trả lời 'false' nếu ngược lại.

Định dạng JSON:
{
    "is_legal_question": true hoặc false,
    "reason": "Giải thích ngắn gọn cho việc phân loại."
}

Câu hỏi của người dùng:
"{research_topic}""#;

/// Prompt for the query-generation step.
pub const QUERY_WRITER_PROMPT: &str = r#"Bạn là một chuyên gia tạo truy vấn tìm kiếm cho các chủ đề pháp lý tại Việt Nam, đặc biệt về các lĩnh vực sau:
- Luật Đất đai, thủ tục mua bán, chuyển nhượng, tặng cho nhà đất.
- Luật Giao thông, thủ tục mua bán, đăng ký xe cộ (ô tô, xe máy).
- Luật Công chứng và các quy định về chứng thực giấy tờ, hợp đồng.
- Các vấn đề/câu hỏi về luật pháp và pháp lý.
- Các câu hỏi về văn phòng/tổ chức công chứng, chứng thực.
- Sát nhập tỉnh/thành phố 2025.

Nhiệm vụ của bạn là tạo ra các truy vấn tìm kiếm Google hiệu quả dựa trên câu hỏi của người dùng.

Hướng dẫn:
- Tạo tối đa {number_queries} truy vấn.
- Các truy vấn phải cụ thể, rõ ràng và sử dụng từ khóa tiếng Việt.
- Tập trung vào việc tìm kiếm các văn bản pháp luật, nghị định, thông tư và các bài viết phân tích từ các nguồn uy tín.
- Luôn bao gồm năm hoặc 'mới nhất' để có thông tin cập nhật.
- Ngày hiện tại: {current_date}
- Ưu tiên tìm kiếm từ các trang web pháp lý hàng đầu Việt Nam:
  * site:luatvietnam.vn
  * site:thuvienphapluat.vn
  * site:chinhphu.vn

Định dạng JSON:
{
    "rationale": "Lý do ngắn gọn cho việc lựa chọn các truy vấn này.",
    "query": ["truy vấn tìm kiếm 1", "truy vấn tìm kiếm 2"]
}

Context: {research_topic}"#;

/// Prompt for the per-query web research step.
pub const WEB_SEARCHER_PROMPT: &str = r#"Tìm kiếm thông tin về "{research_topic}" liên quan đến Luật pháp, sát nhập tỉnh/thành phố 2025, văn phòng/tổ chức công chứng, chứng thực Luật Công chứng và Chứng thực tại Việt Nam.

Hướng dẫn:
- Chỉ tìm kiếm thông tin liên quan đến pháp luật Việt Nam trong các lĩnh vực đã nêu.
- Ngày hiện tại: {current_date}
- Trích xuất các thông tin cốt lõi và có nguồn gốc rõ ràng:
  * Tên và số hiệu văn bản pháp luật (Luật, Nghị định, Thông tư).
  * Ngày ban hành và ngày có hiệu lực.
  * Các điều khoản, quy định chính liên quan trực tiếp đến câu hỏi.
  * Tình trạng hiệu lực của văn bản (còn hiệu lực, hết hiệu lực, đã sửa đổi).

Ưu tiên các nguồn thông tin chính thống và uy tín:
1. luatvietnam.vn
2. thuvienphapluat.vn
3. chinhphu.vn (Cổng thông tin điện tử Chính phủ)

Chủ đề nghiên cứu:
{research_topic}"#;

/// Prompt for the answer-finalization step.
pub const ANSWER_PROMPT: &str = r#"Trợ lý pháp lý chuyên về công chứng và chứng thực tại Việt Nam.

Hướng dẫn:
- Cung cấp câu trả lời dựa trên thông tin đã được tổng hợp từ các nguồn luật uy tín.
- Ngôn ngữ phải đơn giản, rõ ràng, tránh các thuật ngữ pháp lý phức tạp.
- Nhấn mạnh các điểm quan trọng, các thay đổi trong luật mới hoặc các lưu ý đặc biệt.
- KHÔNG đưa ngày hiện tại vào câu trả lời.
- LƯU Ý QUAN TRỌNG:
    - Luật Đất Đai 31/2024/QH15 có hiệu lực từ 01/08/2024.
    - **Luật Nhà ở số 27/2023/QH15** ngày 27/11/2023 **có hiệu lực từ ngày 01/08/2024**, không phải 01/01/2025. Cần phân biệt rõ ràng thời điểm hiệu lực của Luật Nhà ở 2023 với Luật Đất đai 2024.

Cấu trúc câu trả lời:
1.  **TÓM TẮT:** Trả lời trực tiếp và ngắn gọn câu hỏi (3-5 gạch đầu dòng).
2.  **GIẢI THÍCH CHI TIẾT:** Phân tích sâu hơn, giải thích các ảnh hưởng của luật. Nếu là thủ tục giấy tờ thì giải thích quy trình.
3.  **CĂN CỨ PHÁP LÝ:** CHỈ liệt kê các văn bản pháp luật liên quan.
4.  **LƯU Ý:** Nêu các điểm rủi ro, các bước tiếp theo hoặc lời khuyên hữu ích.

Nguyên tắc:
- Trả lời đúng trọng tâm câu hỏi người dùng.
- Ngôn ngữ đơn giản, dễ hiểu.
- Câu ngắn gọn, rõ ràng.
- Tập trung thông tin thực tế.
- Trích dẫn luật khi cần: "Theo [Tên văn bản] số [số hiệu] ngày [ngày ban hành], [nội dung]"

[Lưu ý: Nội dung tư vấn trên đây chỉ mang tính tham khảo. Tùy từng thời điểm và đối tượng khác nhau mà nội dung trả lời trên có thể sẽ không còn phù hợp do sự thay đổi của chính sách pháp luật.]

User Context:
- {research_topic}

Summaries:
{summaries}"#;

/// Fixed refusal for out-of-domain questions.
pub const REFUSAL_MESSAGE: &str = "Tôi xin lỗi, tôi chỉ có thể trả lời các câu hỏi liên quan đến luật, công chứng và chứng thực. Vui lòng đặt một câu hỏi khác.";

/// Default prompt directory under user config.
const DEFAULT_PROMPT_DIR: &str = ".config/phaply-rs/prompts";

/// Filenames for each prompt template.
const CLASSIFICATION_FILENAME: &str = "classification.md";
/// Filename for the query-writer prompt template.
const QUERY_WRITER_FILENAME: &str = "query_writer.md";
/// Filename for the web-searcher prompt template.
const WEB_SEARCHER_FILENAME: &str = "web_searcher.md";
/// Filename for the answer prompt template.
const ANSWER_FILENAME: &str = "answer.md";

/// A set of prompt templates for all pipeline steps.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults. Use [`PromptSet::load`] to resolve the prompt
/// directory from CLI flags, environment variables, or the default path.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// Template for the classification step.
    pub classification: String,
    /// Template for the query-generation step.
    pub query_writer: String,
    /// Template for the web research step.
    pub web_searcher: String,
    /// Template for the answer-finalization step.
    pub answer: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for `prompt_dir`:
    /// 1. Explicit `prompt_dir` argument (from `--prompt-dir` CLI flag)
    /// 2. `PHAPLY_PROMPT_DIR` environment variable
    /// 3. `~/.config/phaply-rs/prompts/`
    ///
    /// Each file is loaded independently — a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(std::path::PathBuf::from)
            .or_else(|| {
                std::env::var("PHAPLY_PROMPT_DIR")
                    .ok()
                    .map(std::path::PathBuf::from)
            })
            .or_else(|| dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR)));

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            classification: load_file(CLASSIFICATION_FILENAME, CLASSIFICATION_PROMPT),
            query_writer: load_file(QUERY_WRITER_FILENAME, QUERY_WRITER_PROMPT),
            web_searcher: load_file(WEB_SEARCHER_FILENAME, WEB_SEARCHER_PROMPT),
            answer: load_file(ANSWER_FILENAME, ANSWER_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            classification: CLASSIFICATION_PROMPT.to_string(),
            query_writer: QUERY_WRITER_PROMPT.to_string(),
            web_searcher: WEB_SEARCHER_PROMPT.to_string(),
            answer: ANSWER_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten — use this for initial scaffolding only.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<std::path::PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (CLASSIFICATION_FILENAME, CLASSIFICATION_PROMPT),
            (QUERY_WRITER_FILENAME, QUERY_WRITER_PROMPT),
            (WEB_SEARCHER_FILENAME, WEB_SEARCHER_PROMPT),
            (ANSWER_FILENAME, ANSWER_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    ///
    /// Returns `None` if the home directory cannot be determined.
    #[must_use]
    pub fn default_dir() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

/// Returns the current date formatted for the prompt templates.
#[must_use]
pub fn current_date() -> String {
    chrono::Local::now().format("%B %d, %Y").to_string()
}

/// Fills the classification template with the research topic.
#[must_use]
pub fn build_classification_prompt(template: &str, research_topic: &str) -> String {
    template.replace("{research_topic}", research_topic)
}

/// Fills the query-writer template with date, topic, and query count.
#[must_use]
pub fn build_query_writer_prompt(
    template: &str,
    date: &str,
    research_topic: &str,
    number_queries: usize,
) -> String {
    template
        .replace("{current_date}", date)
        .replace("{research_topic}", research_topic)
        .replace("{number_queries}", &number_queries.to_string())
}

/// Fills the web-searcher template with date and the branch's query.
#[must_use]
pub fn build_web_searcher_prompt(template: &str, date: &str, research_topic: &str) -> String {
    template
        .replace("{current_date}", date)
        .replace("{research_topic}", research_topic)
}

/// Fills the answer template with topic and the joined research summaries.
#[must_use]
pub fn build_answer_prompt(template: &str, research_topic: &str, summaries: &str) -> String {
    template
        .replace("{research_topic}", research_topic)
        .replace("{summaries}", summaries)
}
