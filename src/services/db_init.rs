use mongodb::{Database, IndexModel, bson::doc};

pub async fn ensure_indexes(db: &Database) -> anyhow::Result<()> {
    let col = db.collection::<mongodb::bson::Document>("alerts");

    // registration cap check and per-token listing
    {
        let model = IndexModel::builder()
            .keys(doc! { "token": 1, "active": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    // poller symbol scan and candidate lookup
    {
        let model = IndexModel::builder()
            .keys(doc! { "active": 1, "source": 1, "symbol": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    Ok(())
}
