// ==========================================
// 过磅单识别器 Mock
// ==========================================
// 职责: 替代外部识别服务，按预设结果返回
// - MockExtractor: 立即返回预设结果，记录调用次数与收到的凭证
// - GatedExtractor: 阻塞直到测试放行，用于并发对账测试
// ==========================================

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use concrete_stock::domain::{Material, MaterialMap, WeightReport};
use concrete_stock::extraction::{
    ExtractionCredential, ExtractionError, ExtractionResult, TicketDocument, TicketExtractor,
};

type Responder = Box<dyn Fn() -> ExtractionResult<WeightReport> + Send + Sync>;

/// 构建扣减报告
///
/// # 参数
/// - b0 / b1 / am / ab: 各物料扣减量（kg）
/// - fine_sand: 细砂读数（kg）
pub fn report(b0: f64, b1: f64, am: f64, ab: f64, fine_sand: f64) -> WeightReport {
    let deductions = MaterialMap::from_fn(|m| match m {
        Material::Brita0 => b0,
        Material::Brita1 => b1,
        Material::AreiaMedia => am,
        Material::AreiaBrita => ab,
    });
    WeightReport::new(deductions, fine_sand)
}

/// 任意单据（内容对 Mock 无意义）
pub fn any_document() -> TicketDocument {
    TicketDocument::new(Some("image/jpeg"), vec![0xFF, 0xD8, 0xFF])
}

// ==========================================
// MockExtractor
// ==========================================
pub struct MockExtractor {
    responder: Responder,
    requires_credential: bool,
    calls: AtomicUsize,
    last_credential: Mutex<Option<String>>,
}

impl MockExtractor {
    /// 总是返回给定报告
    pub fn returning(report: WeightReport) -> Self {
        Self::with_responder(Box::new(move || Ok(report)))
    }

    /// 总是返回由工厂函数构造的错误
    pub fn failing(make_error: fn() -> ExtractionError) -> Self {
        Self::with_responder(Box::new(move || Err(make_error())))
    }

    fn with_responder(responder: Responder) -> Self {
        Self {
            responder,
            requires_credential: true,
            calls: AtomicUsize::new(0),
            last_credential: Mutex::new(None),
        }
    }

    /// 声明为无需凭证的识别器
    pub fn without_credential(mut self) -> Self {
        self.requires_credential = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_credential(&self) -> Option<String> {
        self.last_credential.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketExtractor for MockExtractor {
    async fn extract_ticket_weights(
        &self,
        credential: Option<&ExtractionCredential>,
        _document: &TicketDocument,
    ) -> ExtractionResult<WeightReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_credential.lock().unwrap() = credential.map(|c| c.expose().to_string());
        (self.responder)()
    }

    fn requires_credential(&self) -> bool {
        self.requires_credential
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ==========================================
// GatedExtractor
// ==========================================
pub struct GatedExtractor {
    report: WeightReport,
    pub started: Notify,
    pub release: Notify,
}

impl GatedExtractor {
    pub fn new(report: WeightReport) -> Self {
        Self {
            report,
            started: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl TicketExtractor for GatedExtractor {
    async fn extract_ticket_weights(
        &self,
        _credential: Option<&ExtractionCredential>,
        _document: &TicketDocument,
    ) -> ExtractionResult<WeightReport> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.report)
    }

    fn requires_credential(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}
