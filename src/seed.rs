use crate::auth::hash_password;
use crate::models::{department, floor, hospital, patient, role, staff, user, ward};
use crate::services::escalation::{serialize_chain, ChainStep};
use sea_orm::*;

/// Seed a demo hospital (plus a second one to exercise scoping) with
/// departments, floors, wards, on-call roles and a sample escalation ladder.
/// Idempotent: does nothing when users already exist.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if user::Entity::find().count(db).await? > 0 {
        tracing::info!("Seed skipped: users already present");
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();

    let general = hospital::ActiveModel {
        name: Set("General Hospital".to_owned()),
        address: Set(Some("1 Care Plaza".to_owned())),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let riverside = hospital::ActiveModel {
        name: Set("Riverside Clinic".to_owned()),
        address: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (username, hospital_id) in [("admin", general.id), ("riverside", riverside.id)] {
        let password_hash = hash_password("admin").unwrap();
        user::ActiveModel {
            username: Set(username.to_owned()),
            password_hash: Set(password_hash),
            role: Set("admin".to_owned()),
            hospital_id: Set(hospital_id),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    let cardiology = department::ActiveModel {
        hospital_id: Set(general.id),
        name: Set("Cardiology".to_owned()),
        description: Set(Some("Cardiac care and monitoring".to_owned())),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    department::ActiveModel {
        hospital_id: Set(general.id),
        name: Set("Emergency".to_owned()),
        description: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let second = floor::ActiveModel {
        hospital_id: Set(general.id),
        name: Set("Second Floor".to_owned()),
        level: Set(2),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let ward_a = ward::ActiveModel {
        hospital_id: Set(general.id),
        name: Set("Ward 2A".to_owned()),
        floor_id: Set(Some(second.id)),
        department_id: Set(Some(cardiology.id)),
        bed_count: Set(Some(12)),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    // On-call ladder: physician -> supervisor (15 min) -> CEO (30 min)
    let ceo = role::ActiveModel {
        hospital_id: Set(general.id),
        name: Set("CEO".to_owned()),
        escalation_chain: Set("[]".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let supervisor = role::ActiveModel {
        hospital_id: Set(general.id),
        name: Set("Supervisor".to_owned()),
        escalation_chain: Set("[]".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let ladder = serialize_chain(&[
        ChainStep {
            target_role_id: supervisor.id,
            delay_minutes: 15,
        },
        ChainStep {
            target_role_id: ceo.id,
            delay_minutes: 30,
        },
    ]);

    let physician = role::ActiveModel {
        hospital_id: Set(general.id),
        name: Set("Physician on-call".to_owned()),
        escalation_chain: Set(ladder),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let attending = staff::ActiveModel {
        hospital_id: Set(general.id),
        name: Set("Dr. Asha Rao".to_owned()),
        title: Set(Some("Attending Physician".to_owned())),
        department_id: Set(Some(cardiology.id)),
        role_id: Set(Some(physician.id)),
        email: Set(Some("arao@example.org".to_owned())),
        phone: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    patient::ActiveModel {
        hospital_id: Set(general.id),
        name: Set("Jordan Mills".to_owned()),
        mrn: Set(Some("MRN-000123".to_owned())),
        ward_id: Set(Some(ward_a.id)),
        attending_staff_id: Set(Some(attending.id)),
        admitted_at: Set(Some(now.clone())),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Demo data seeded for hospitals {} and {}", general.id, riverside.id);
    Ok(())
}
