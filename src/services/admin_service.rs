use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::store::{Persisted, SettingsStore};
use crate::utils::{IdGenerator, format_kr_phone};
use std::sync::Arc;

/// 后台管理操作：读取文档、修改、校验后写回 store
#[derive(Clone)]
pub struct AdminService {
    store: Arc<SettingsStore>,
    ids: IdGenerator,
}

fn find_mut<'a, T>(
    items: &'a mut [T],
    id: i64,
    id_of: impl Fn(&T) -> i64,
    label: &str,
) -> AppResult<&'a mut T> {
    items
        .iter_mut()
        .find(|item| id_of(item) == id)
        .ok_or_else(|| AppError::NotFound(format!("{label} {id} not found")))
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: i64,
    id_of: impl Fn(&T) -> i64,
    label: &str,
) -> AppResult<T> {
    let index = items
        .iter()
        .position(|item| id_of(item) == id)
        .ok_or_else(|| AppError::NotFound(format!("{label} {id} not found")))?;
    Ok(items.remove(index))
}

impl AdminService {
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self {
            store,
            ids: IdGenerator::new(),
        }
    }

    pub fn store(&self) -> &Arc<SettingsStore> {
        &self.store
    }

    async fn commit<T: crate::store::SettingsDocument>(&self, doc: &T) -> AppResult<Persisted> {
        Ok(self.store.save(doc)?.await)
    }

    // ---- 预约 ----

    pub fn reservations(&self) -> Vec<Reservation> {
        self.store.load()
    }

    pub async fn add_reservation(&self, input: NewReservation) -> AppResult<(Reservation, Persisted)> {
        let mut reservations = self.reservations();
        let id = self.ids.next_unused(|id| reservations.iter().any(|r| r.id == id));
        let reservation = Reservation {
            id,
            time: input.time,
            date: input.date,
            customer_name: input.customer_name.trim().to_string(),
            customer_phone: format_kr_phone(&input.customer_phone),
            program: input.program,
            trainer: input.trainer,
            status: ReservationStatus::Pending,
        };
        reservations.push(reservation.clone());
        let persisted = self.commit(&reservations).await?;
        log::info!("Reservation {id} created for {}", reservation.date);
        Ok((reservation, persisted))
    }

    pub async fn update_reservation_status(
        &self,
        id: i64,
        status: ReservationStatus,
    ) -> AppResult<Persisted> {
        let mut reservations = self.reservations();
        find_mut(&mut reservations, id, |r| r.id, "Reservation")?.status = status;
        self.commit(&reservations).await
    }

    pub async fn delete_reservation(&self, id: i64) -> AppResult<Persisted> {
        let mut reservations = self.reservations();
        remove_by_id(&mut reservations, id, |r| r.id, "Reservation")?;
        self.commit(&reservations).await
    }

    // ---- 会员 ----

    pub fn members(&self) -> Vec<Member> {
        self.store.load()
    }

    pub async fn add_member(&self, input: NewMember) -> AppResult<(Member, Persisted)> {
        let mut members = self.members();
        let id = self.ids.next_unused(|id| members.iter().any(|m| m.id == id));
        let member = Member {
            id,
            name: input.name.trim().to_string(),
            phone: format_kr_phone(&input.phone),
            email: input.email.trim().to_string(),
            program: input.program,
            join_date: today(),
            status: MemberStatus::Active,
        };
        members.push(member.clone());
        let persisted = self.commit(&members).await?;
        log::info!("Member {id} registered");
        Ok((member, persisted))
    }

    pub async fn update_member_status(&self, id: i64, status: MemberStatus) -> AppResult<Persisted> {
        let mut members = self.members();
        find_mut(&mut members, id, |m| m.id, "Member")?.status = status;
        self.commit(&members).await
    }

    pub async fn delete_member(&self, id: i64) -> AppResult<Persisted> {
        let mut members = self.members();
        remove_by_id(&mut members, id, |m| m.id, "Member")?;
        self.commit(&members).await
    }

    // ---- 评价 ----

    pub fn reviews(&self) -> Vec<Review> {
        self.store.load()
    }

    /// 前台提交的评价，需后台审核后才会公开
    pub async fn submit_review(&self, input: NewReview) -> AppResult<(Review, Persisted)> {
        let mut reviews = self.reviews();
        let id = self.ids.next_unused(|id| reviews.iter().any(|r| r.id == id));
        let review = Review {
            id,
            name: input.name.trim().to_string(),
            program: input.program,
            rating: input.rating,
            content: input.content.trim().to_string(),
            date: today(),
            status: ReviewStatus::Pending,
        };
        review.validate()?;
        reviews.push(review.clone());
        let persisted = self.commit(&reviews).await?;
        Ok((review, persisted))
    }

    pub async fn update_review_status(&self, id: i64, status: ReviewStatus) -> AppResult<Persisted> {
        let mut reviews = self.reviews();
        find_mut(&mut reviews, id, |r| r.id, "Review")?.status = status;
        self.commit(&reviews).await
    }

    pub async fn delete_review(&self, id: i64) -> AppResult<Persisted> {
        let mut reviews = self.reviews();
        remove_by_id(&mut reviews, id, |r| r.id, "Review")?;
        self.commit(&reviews).await
    }

    pub fn approved_reviews(&self) -> Vec<Review> {
        self.reviews()
            .into_iter()
            .filter(|r| r.status == ReviewStatus::Approved)
            .collect()
    }

    // ---- 作品集 ----

    pub fn portfolios(&self) -> Vec<Portfolio> {
        self.store.load()
    }

    pub async fn add_portfolio(&self, form: PortfolioForm) -> AppResult<(Portfolio, Persisted)> {
        let mut portfolios = self.portfolios();
        let id = self.ids.next_unused(|id| portfolios.iter().any(|p| p.id == id));
        let portfolio = Portfolio::from_form(id, form, today());
        portfolios.push(portfolio.clone());
        let persisted = self.commit(&portfolios).await?;
        Ok((portfolio, persisted))
    }

    /// 更新内容，保留原 ID 与日期
    pub async fn update_portfolio(&self, id: i64, form: PortfolioForm) -> AppResult<Persisted> {
        let mut portfolios = self.portfolios();
        let existing = find_mut(&mut portfolios, id, |p| p.id, "Portfolio")?;
        let date = std::mem::take(&mut existing.date);
        *existing = Portfolio::from_form(id, form, date);
        self.commit(&portfolios).await
    }

    pub async fn delete_portfolio(&self, id: i64) -> AppResult<Persisted> {
        let mut portfolios = self.portfolios();
        remove_by_id(&mut portfolios, id, |p| p.id, "Portfolio")?;
        self.commit(&portfolios).await
    }

    // ---- 横幅 ----

    pub fn banner_settings(&self) -> BannerSettings {
        self.store.load()
    }

    pub async fn add_banner_item(&self, input: BannerItemInput) -> AppResult<(BannerItem, Persisted)> {
        let mut settings = self.banner_settings();
        let id = self
            .ids
            .next_unused(|id| settings.items.iter().any(|item| item.id == id));
        let item = BannerItem {
            id,
            kind: input.kind,
            url: input.url,
            title: input.title,
            description: input.description,
        };
        settings.items.push(item.clone());
        let persisted = self.commit(&settings).await?;
        Ok((item, persisted))
    }

    pub async fn update_banner_item(&self, id: i64, input: BannerItemInput) -> AppResult<Persisted> {
        let mut settings = self.banner_settings();
        let item = find_mut(&mut settings.items, id, |item| item.id, "Banner item")?;
        item.kind = input.kind;
        item.url = input.url;
        item.title = input.title;
        item.description = input.description;
        self.commit(&settings).await
    }

    pub async fn delete_banner_item(&self, id: i64) -> AppResult<Persisted> {
        let mut settings = self.banner_settings();
        remove_by_id(&mut settings.items, id, |item| item.id, "Banner item")?;
        self.commit(&settings).await
    }

    /// 更新轮播间隔与高度，超出范围的值会被截断
    pub async fn update_banner_display(&self, interval_ms: u64, height_px: u32) -> AppResult<Persisted> {
        let mut settings = self.banner_settings();
        settings.interval = interval_ms;
        settings.height = height_px;
        self.commit(&settings.clamped()).await
    }

    // ---- 支付 ----

    pub fn payment_settings(&self) -> PaymentSettings {
        self.store.load()
    }

    pub async fn save_payment_settings(&self, settings: PaymentSettings) -> AppResult<Persisted> {
        self.commit(&settings).await
    }

    pub async fn add_program(&self, input: ProgramInput) -> AppResult<(Program, Persisted)> {
        let mut settings = self.payment_settings();
        let id = self
            .ids
            .next_unused(|id| settings.programs.iter().any(|p| p.id == id));
        let program = Program {
            id,
            name: input.name.trim().to_string(),
            price: input.price,
            description: input.description,
            duration: input.duration,
            active: input.active,
        };
        settings.programs.push(program.clone());
        let persisted = self.commit(&settings).await?;
        Ok((program, persisted))
    }

    pub async fn update_program(&self, id: i64, input: ProgramInput) -> AppResult<Persisted> {
        let mut settings = self.payment_settings();
        let program = find_mut(&mut settings.programs, id, |p| p.id, "Program")?;
        program.name = input.name.trim().to_string();
        program.price = input.price;
        program.description = input.description;
        program.duration = input.duration;
        program.active = input.active;
        self.commit(&settings).await
    }

    pub async fn delete_program(&self, id: i64) -> AppResult<Persisted> {
        let mut settings = self.payment_settings();
        remove_by_id(&mut settings.programs, id, |p| p.id, "Program")?;
        self.commit(&settings).await
    }

    pub async fn toggle_program(&self, id: i64) -> AppResult<Persisted> {
        let mut settings = self.payment_settings();
        let program = find_mut(&mut settings.programs, id, |p| p.id, "Program")?;
        program.active = !program.active;
        self.commit(&settings).await
    }

    pub fn active_programs(&self) -> Vec<Program> {
        self.payment_settings().active_programs().cloned().collect()
    }

    // ---- 统计 ----

    pub fn base_stats(&self) -> BaseStats {
        self.store.load()
    }

    pub async fn save_base_stats(&self, stats: BaseStats) -> AppResult<Persisted> {
        self.commit(&stats).await
    }

    pub fn dashboard(&self) -> DashboardStats {
        let base = self.base_stats();
        let reservations = self.reservations();
        let members = self.members();
        let today = today();

        DashboardStats {
            total_reservations: base.total_reservations + reservations.len() as u64,
            total_registered: base.total_registered + members.len() as u64,
            today_reservations: reservations.iter().filter(|r| r.date == today).count() as u64,
            confirmed_reservations: reservations
                .iter()
                .filter(|r| r.status == ReservationStatus::Confirmed)
                .count() as u64,
        }
    }
}
